//! Frame compositor: walks a sized layout tree and concatenates camera
//! buffers.
//!
//! Sizing happens once when layouts are built, so composition only copies
//! pixels. Buffers are expected to match their target sizes already; a
//! mismatch is logged and padded, never a panic.

use image::{imageops, RgbImage};
use multiview_model::Direction;
use multiview_processing::LayoutNode;

/// Compose the frame for `node`, fetching leaf buffers through `accessor`.
pub fn concatenate<F>(node: &LayoutNode, accessor: &mut F) -> RgbImage
where
    F: FnMut(&str) -> RgbImage,
{
    match node {
        LayoutNode::Leaf { camera, .. } => accessor(camera),
        LayoutNode::Junction {
            direction,
            left,
            right,
            ..
        } => {
            let first = concatenate(left, accessor);
            let second = concatenate(right, accessor);
            match direction {
                Direction::Horizontal => hconcat(&first, &second),
                Direction::Vertical => vconcat(&first, &second),
            }
        }
    }
}

/// Place `right` to the right of `left`.
pub fn hconcat(left: &RgbImage, right: &RgbImage) -> RgbImage {
    if left.height() != right.height() {
        tracing::warn!(
            left = left.height(),
            right = right.height(),
            "Height mismatch in horizontal concatenation; padding with black"
        );
    }
    let mut canvas = RgbImage::new(
        left.width() + right.width(),
        left.height().max(right.height()),
    );
    imageops::replace(&mut canvas, left, 0, 0);
    imageops::replace(&mut canvas, right, i64::from(left.width()), 0);
    canvas
}

/// Place `bottom` below `top`.
pub fn vconcat(top: &RgbImage, bottom: &RgbImage) -> RgbImage {
    if top.width() != bottom.width() {
        tracing::warn!(
            top = top.width(),
            bottom = bottom.width(),
            "Width mismatch in vertical concatenation; padding with black"
        );
    }
    let mut canvas = RgbImage::new(
        top.width().max(bottom.width()),
        top.height() + bottom.height(),
    );
    imageops::replace(&mut canvas, top, 0, 0);
    imageops::replace(&mut canvas, bottom, 0, i64::from(top.height()));
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use multiview_model::Size;

    fn solid(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn test_hconcat_places_side_by_side() {
        let out = hconcat(&solid(2, 3, 10), &solid(4, 3, 20));
        assert_eq!((out.width(), out.height()), (6, 3));
        assert_eq!(out.get_pixel(1, 2), &Rgb([10, 10, 10]));
        assert_eq!(out.get_pixel(2, 0), &Rgb([20, 20, 20]));
    }

    #[test]
    fn test_vconcat_stacks() {
        let out = vconcat(&solid(3, 1, 10), &solid(3, 2, 20));
        assert_eq!((out.width(), out.height()), (3, 3));
        assert_eq!(out.get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(out.get_pixel(0, 1), &Rgb([20, 20, 20]));
    }

    #[test]
    fn test_mismatch_pads_instead_of_panicking() {
        let out = hconcat(&solid(2, 2, 10), &solid(2, 3, 20));
        assert_eq!((out.width(), out.height()), (4, 3));
        assert_eq!(out.get_pixel(0, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_concatenate_walks_tree_in_order() {
        let tree = LayoutNode::Junction {
            direction: Direction::Horizontal,
            left: Box::new(LayoutNode::leaf("a", Size::new(2, 1))),
            right: Box::new(LayoutNode::Junction {
                direction: Direction::Vertical,
                left: Box::new(LayoutNode::leaf("b", Size::new(1, 2))),
                right: Box::new(LayoutNode::leaf("c", Size::new(1, 2))),
                size: Size::new(2, 2),
            }),
            size: Size::new(2, 3),
        };

        let mut visited = Vec::new();
        let out = concatenate(&tree, &mut |name: &str| {
            visited.push(name.to_string());
            match name {
                "a" => solid(1, 2, 1),
                "b" => solid(2, 1, 2),
                _ => solid(2, 1, 3),
            }
        });

        assert_eq!(visited, ["a", "b", "c"]);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.get_pixel(0, 1), &Rgb([1, 1, 1]));
        assert_eq!(out.get_pixel(2, 0), &Rgb([2, 2, 2]));
        assert_eq!(out.get_pixel(2, 1), &Rgb([3, 3, 3]));
    }
}
