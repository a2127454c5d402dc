//! Synthetic camera images for offline rendering and benchmarks.

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

const PALETTE: [[u8; 3]; 6] = [
    [60, 90, 160],
    [60, 140, 80],
    [150, 70, 60],
    [130, 110, 40],
    [100, 60, 140],
    [50, 120, 130],
];

/// A camera test pattern: tinted background, grid, center disc, and a
/// marker in the top-left corner so rotations are visible.
pub fn camera_pattern(width: u32, height: u32, index: usize) -> RgbImage {
    let base = PALETTE[index % PALETTE.len()];
    let mut img = ImageBuffer::from_pixel(width, height, Rgb(base));

    let grid_spacing = 80;
    let line_color = Rgb(base.map(|c| c.saturating_add(50)));
    for x in (0..width).step_by(grid_spacing) {
        for y in 0..height {
            img.put_pixel(x, y, line_color);
        }
    }
    for y in (0..height).step_by(grid_spacing) {
        for x in 0..width {
            img.put_pixel(x, y, line_color);
        }
    }

    let radius = (width.min(height) / 8).max(1) as i32;
    draw_filled_circle_mut(
        &mut img,
        ((width / 2) as i32, (height / 2) as i32),
        radius,
        Rgb([230, 230, 230]),
    );

    let marker = (width.min(height) / 6).max(1);
    draw_filled_rect_mut(
        &mut img,
        Rect::at(10, 10).of_size(marker, marker / 2 + 1),
        Rgb([250, 210, 40]),
    );

    img
}
