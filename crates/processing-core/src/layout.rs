//! Layout tree construction and proportional sizing.
//!
//! # Algorithm
//!
//! 1. **Leaves** start at their camera's effective resolution (480×640 for
//!    cameras without a definition).
//! 2. **Junctions** are built pairwise, left to right. When two subtrees
//!    disagree on the dimension perpendicular to the junction direction, the
//!    larger one is scaled down to the smaller one; nothing is upscaled.
//! 3. **Resizing** a junction hands its left child a proportional share of
//!    the new size along the junction axis and gives the right child the
//!    remainder, so children always sum exactly to their parent.
//! 4. Every leaf resize records the camera's final **target size**.
//!
//! All rounding is exact integer arithmetic with ties away from zero.

use std::collections::{BTreeMap, HashMap};

use multiview_model::{Direction, LayoutNodeConfig, OrderedMap, Size};

/// Camera name → size the camera's image must have at composition time.
pub type TargetSizeMap = BTreeMap<String, Size>;

/// Errors raised while building a layout tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{path}: junction node must have at least 2 children, found {found}")]
    TooFewChildren { path: String, found: usize },

    #[error("no layouts configured")]
    NoLayouts,
}

/// A sized node of a built layout. Junctions always have exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Leaf {
        camera: String,
        size: Size,
    },
    Junction {
        direction: Direction,
        left: Box<LayoutNode>,
        right: Box<LayoutNode>,
        size: Size,
    },
}

impl LayoutNode {
    pub fn leaf(camera: impl Into<String>, size: Size) -> Self {
        LayoutNode::Leaf {
            camera: camera.into(),
            size,
        }
    }

    pub fn size(&self) -> Size {
        match self {
            LayoutNode::Leaf { size, .. } | LayoutNode::Junction { size, .. } => *size,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, LayoutNode::Leaf { .. })
    }

    /// Leaf cameras in left-to-right order.
    pub fn cameras(&self) -> Vec<&str> {
        match self {
            LayoutNode::Leaf { camera, .. } => vec![camera.as_str()],
            LayoutNode::Junction { left, right, .. } => {
                let mut cameras = left.cameras();
                cameras.extend(right.cameras());
                cameras
            }
        }
    }

    /// Resize this subtree to `new_size`, recording leaf sizes in `targets`.
    pub fn resize(&mut self, new_size: Size, targets: &mut TargetSizeMap) {
        match self {
            LayoutNode::Leaf { camera, size } => {
                *size = new_size;
                targets.insert(camera.clone(), new_size);
            }
            LayoutNode::Junction {
                direction,
                left,
                right,
                size,
            } => {
                let (left_size, right_size) = match direction {
                    Direction::Vertical => {
                        let top = scale(left.size().height, new_size.height, size.height);
                        (
                            Size::new(top, new_size.width),
                            Size::new(new_size.height - top, new_size.width),
                        )
                    }
                    Direction::Horizontal => {
                        let first = scale(left.size().width, new_size.width, size.width);
                        (
                            Size::new(new_size.height, first),
                            Size::new(new_size.height, new_size.width - first),
                        )
                    }
                };
                *size = new_size;
                left.resize(left_size, targets);
                right.resize(right_size, targets);
            }
        }
    }
}

/// `round(value * numerator / denominator)`, ties away from zero.
///
/// A zero denominator yields zero. The result never exceeds `numerator` when
/// `value <= denominator`.
pub fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let (value, numerator, denominator) = (value as u64, numerator as u64, denominator as u64);
    let rounded = (2 * value * numerator + denominator) / (2 * denominator);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Join two sized subtrees along `direction`, scaling the larger one down
/// so both share the perpendicular dimension.
pub fn make_junction(
    mut first: LayoutNode,
    mut second: LayoutNode,
    direction: Direction,
    targets: &mut TargetSizeMap,
) -> LayoutNode {
    let (a, b) = (first.size(), second.size());

    let size = match direction {
        Direction::Vertical => {
            if a.width > b.width {
                first.resize(Size::new(scale(a.height, b.width, a.width), b.width), targets);
            } else if a.width < b.width {
                second.resize(Size::new(scale(b.height, a.width, b.width), a.width), targets);
            }
            Size::new(
                first.size().height + second.size().height,
                first.size().width,
            )
        }
        Direction::Horizontal => {
            if a.height > b.height {
                first.resize(Size::new(b.height, scale(a.width, b.height, a.height)), targets);
            } else if a.height < b.height {
                second.resize(Size::new(a.height, scale(b.width, a.height, b.height)), targets);
            }
            Size::new(
                first.size().height,
                first.size().width + second.size().width,
            )
        }
    };

    LayoutNode::Junction {
        direction,
        left: Box::new(first),
        right: Box::new(second),
        size,
    }
}

/// Build a sized binary tree from an n-ary layout configuration.
///
/// `path` names the node in error messages (e.g. `layouts.main`).
pub fn build_layout(
    config: &LayoutNodeConfig,
    camera_sizes: &HashMap<String, Size>,
    targets: &mut TargetSizeMap,
    path: &str,
) -> Result<LayoutNode, LayoutError> {
    match config {
        LayoutNodeConfig::Camera { camera } => {
            let size = camera_sizes
                .get(camera)
                .copied()
                .unwrap_or(Size::DEFAULT_CAMERA);
            targets.insert(camera.clone(), size);
            Ok(LayoutNode::leaf(camera.clone(), size))
        }
        LayoutNodeConfig::Junction {
            direction,
            children,
        } => {
            if children.len() < 2 {
                return Err(LayoutError::TooFewChildren {
                    path: path.to_string(),
                    found: children.len(),
                });
            }

            let mut nodes = Vec::with_capacity(children.len());
            for (i, child) in children.iter().enumerate() {
                let child_path = format!("{path}.children[{i}]");
                nodes.push(build_layout(child, camera_sizes, targets, &child_path)?);
            }

            // Left-to-right fold: ((a, b), c), ...
            let mut nodes = nodes.into_iter();
            let first = nodes.next().ok_or(LayoutError::TooFewChildren {
                path: path.to_string(),
                found: 0,
            })?;
            Ok(nodes.fold(first, |acc, node| {
                make_junction(acc, node, *direction, targets)
            }))
        }
    }
}

/// Build one layout and return its root with the camera target sizes.
pub fn compute_layout(
    config: &LayoutNodeConfig,
    camera_sizes: &HashMap<String, Size>,
    path: &str,
) -> Result<(LayoutNode, TargetSizeMap), LayoutError> {
    let mut targets = TargetSizeMap::new();
    let root = build_layout(config, camera_sizes, &mut targets, path)?;
    Ok((root, targets))
}

/// Every configured layout, built once, in declaration order.
#[derive(Debug, Clone)]
pub struct LayoutManager {
    names: Vec<String>,
    roots: Vec<LayoutNode>,
    targets: Vec<TargetSizeMap>,
    active_index: usize,
}

impl LayoutManager {
    /// Build all layouts. `active_layout` selects the layout that carries
    /// text overlays; unknown or absent names select the first one.
    pub fn new(
        layouts: &OrderedMap<LayoutNodeConfig>,
        camera_sizes: &HashMap<String, Size>,
        active_layout: Option<&str>,
    ) -> Result<Self, LayoutError> {
        if layouts.is_empty() {
            return Err(LayoutError::NoLayouts);
        }

        let mut names = Vec::with_capacity(layouts.len());
        let mut roots = Vec::with_capacity(layouts.len());
        let mut targets = Vec::with_capacity(layouts.len());

        for (name, config) in layouts.iter() {
            let (root, sizes) = compute_layout(config, camera_sizes, &format!("layouts.{name}"))?;
            tracing::debug!(
                layout = name,
                output = %root.size(),
                cameras = sizes.len(),
                "Computed layout"
            );
            names.push(name.to_string());
            roots.push(root);
            targets.push(sizes);
        }

        let active_index = active_layout
            .and_then(|name| names.iter().position(|n| n == name))
            .unwrap_or(0);

        Ok(Self {
            names,
            roots,
            targets,
            active_index,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn root(&self, index: usize) -> Option<&LayoutNode> {
        self.roots.get(index)
    }

    pub fn target_sizes(&self, index: usize) -> Option<&TargetSizeMap> {
        self.targets.get(index)
    }

    /// Target size of `camera` in layout `index`; 480×640 when the camera
    /// is not part of that layout.
    pub fn target_size(&self, camera: &str, index: usize) -> Size {
        self.targets
            .get(index)
            .and_then(|sizes| sizes.get(camera))
            .copied()
            .unwrap_or(Size::DEFAULT_CAMERA)
    }

    /// Index of the layout that receives text overlays.
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Pixel size of the composed frame for layout `index`.
    pub fn output_size(&self, index: usize) -> Option<Size> {
        self.roots.get(index).map(LayoutNode::size)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayoutNode)> {
        self.names.iter().map(String::as_str).zip(self.roots.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sizes<const N: usize>(entries: [(&str, u32, u32); N]) -> HashMap<String, Size> {
        entries
            .into_iter()
            .map(|(name, h, w)| (name.to_string(), Size::new(h, w)))
            .collect()
    }

    fn cam(name: &str) -> LayoutNodeConfig {
        LayoutNodeConfig::camera(name)
    }

    /// Every junction's children share the perpendicular dimension and sum
    /// exactly to the junction along its axis.
    fn assert_consistent(node: &LayoutNode) {
        if let LayoutNode::Junction {
            direction,
            left,
            right,
            size,
        } = node
        {
            let (l, r) = (left.size(), right.size());
            match direction {
                Direction::Vertical => {
                    assert_eq!(l.width, r.width);
                    assert_eq!(l.width, size.width);
                    assert_eq!(l.height + r.height, size.height);
                }
                Direction::Horizontal => {
                    assert_eq!(l.height, r.height);
                    assert_eq!(l.height, size.height);
                    assert_eq!(l.width + r.width, size.width);
                }
            }
            assert_consistent(left);
            assert_consistent(right);
        }
    }

    fn leaf_sizes(node: &LayoutNode, out: &mut Vec<(String, Size)>) {
        match node {
            LayoutNode::Leaf { camera, size } => out.push((camera.clone(), *size)),
            LayoutNode::Junction { left, right, .. } => {
                leaf_sizes(left, out);
                leaf_sizes(right, out);
            }
        }
    }

    #[test]
    fn test_scale_rounds_half_away_from_zero() {
        assert_eq!(scale(1281, 2, 4), 641); // 640.5
        assert_eq!(scale(1493, 240, 480), 747); // 746.5
        assert_eq!(scale(1280, 480, 720), 853); // 853.33
        assert_eq!(scale(5, 1, 3), 2); // 1.67
        assert_eq!(scale(10, 0, 7), 0);
        assert_eq!(scale(10, 3, 0), 0);
    }

    #[test]
    fn test_equal_heights_need_no_resize() {
        let config = LayoutNodeConfig::horizontal(vec![cam("a"), cam("b")]);
        let (root, targets) =
            compute_layout(&config, &sizes([("a", 480, 640), ("b", 480, 320)]), "main").unwrap();

        assert_eq!(root.size(), Size::new(480, 960));
        assert_eq!(targets["a"], Size::new(480, 640));
        assert_eq!(targets["b"], Size::new(480, 320));
    }

    #[test]
    fn test_larger_camera_scaled_down_horizontally() {
        let config = LayoutNodeConfig::horizontal(vec![cam("a"), cam("b")]);
        let (root, targets) =
            compute_layout(&config, &sizes([("a", 480, 640), ("b", 720, 1280)]), "main").unwrap();

        assert_eq!(targets["a"], Size::new(480, 640));
        assert_eq!(targets["b"], Size::new(480, 853));
        assert_eq!(root.size(), Size::new(480, 1493));
    }

    #[test]
    fn test_larger_camera_scaled_down_vertically() {
        let config = LayoutNodeConfig::vertical(vec![cam("wide"), cam("narrow")]);
        let (root, targets) = compute_layout(
            &config,
            &sizes([("wide", 720, 1280), ("narrow", 480, 640)]),
            "main",
        )
        .unwrap();

        assert_eq!(targets["wide"], Size::new(360, 640));
        assert_eq!(targets["narrow"], Size::new(480, 640));
        assert_eq!(root.size(), Size::new(840, 640));
    }

    #[test]
    fn test_tie_rounds_up() {
        let config = LayoutNodeConfig::horizontal(vec![cam("a"), cam("b")]);
        let (_, targets) =
            compute_layout(&config, &sizes([("a", 2, 10), ("b", 4, 1281)]), "main").unwrap();
        assert_eq!(targets["b"], Size::new(2, 641));
    }

    #[test]
    fn test_nested_resize_sums_exactly() {
        let config =
            LayoutNodeConfig::horizontal(vec![LayoutNodeConfig::vertical(vec![cam("a"), cam("b")]), cam("c")]);
        let (root, targets) = compute_layout(
            &config,
            &sizes([("a", 100, 300), ("b", 101, 300), ("c", 100, 100)]),
            "main",
        )
        .unwrap();

        // The 201x300 column is scaled to height 100: width 149, split 50/50.
        assert_eq!(targets["a"], Size::new(50, 149));
        assert_eq!(targets["b"], Size::new(50, 149));
        assert_eq!(targets["c"], Size::new(100, 100));
        assert_eq!(root.size(), Size::new(100, 249));
        assert_consistent(&root);
    }

    #[test]
    fn test_children_fold_left_to_right() {
        let config = LayoutNodeConfig::horizontal(vec![cam("a"), cam("b"), cam("c")]);
        let (root, targets) = compute_layout(
            &config,
            &sizes([("a", 480, 640), ("b", 720, 1280), ("c", 240, 320)]),
            "main",
        )
        .unwrap();

        // (a, b) is 480x1493, then shrunk to height 240 (width 746.5 -> 747)
        // to meet c.
        assert_eq!(targets["a"], Size::new(240, 320));
        assert_eq!(targets["b"], Size::new(240, 427));
        assert_eq!(targets["c"], Size::new(240, 320));
        assert_eq!(root.size(), Size::new(240, 1067));

        let LayoutNode::Junction { left, right, .. } = &root else {
            panic!("expected junction root");
        };
        assert!(!left.is_leaf());
        assert!(right.is_leaf());
        assert_eq!(root.cameras(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_camera_uses_default_size() {
        let config = LayoutNodeConfig::horizontal(vec![cam("ghost"), cam("a")]);
        let (_, targets) = compute_layout(&config, &sizes([("a", 480, 320)]), "main").unwrap();
        assert_eq!(targets["ghost"], Size::DEFAULT_CAMERA);
    }

    #[test]
    fn test_too_few_children_is_an_error() {
        let config = LayoutNodeConfig::horizontal(vec![
            LayoutNodeConfig::vertical(vec![cam("a")]),
            cam("b"),
        ]);
        let err = compute_layout(&config, &HashMap::new(), "layouts.main").unwrap_err();
        assert_eq!(
            err,
            LayoutError::TooFewChildren {
                path: "layouts.main.children[0]".to_string(),
                found: 1,
            }
        );
    }

    #[test]
    fn test_manager_indices_and_defaults() {
        let layouts: OrderedMap<LayoutNodeConfig> = [
            ("side", LayoutNodeConfig::horizontal(vec![cam("a"), cam("b")])),
            ("stack", LayoutNodeConfig::vertical(vec![cam("a"), cam("b")])),
        ]
        .into_iter()
        .collect();
        let camera_sizes = sizes([("a", 480, 640), ("b", 480, 640)]);

        let manager = LayoutManager::new(&layouts, &camera_sizes, Some("stack")).unwrap();
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.names(), ["side", "stack"]);
        assert_eq!(manager.active_index(), 1);
        assert_eq!(manager.index_of("side"), Some(0));
        assert_eq!(manager.output_size(0), Some(Size::new(480, 1280)));
        assert_eq!(manager.output_size(1), Some(Size::new(960, 640)));
        assert_eq!(manager.output_size(2), None);
        assert_eq!(manager.target_size("nobody", 0), Size::DEFAULT_CAMERA);

        let fallback = LayoutManager::new(&layouts, &camera_sizes, Some("missing")).unwrap();
        assert_eq!(fallback.active_index(), 0);
    }

    #[test]
    fn test_manager_requires_layouts() {
        let err = LayoutManager::new(&OrderedMap::new(), &HashMap::new(), None).unwrap_err();
        assert_eq!(err, LayoutError::NoLayouts);
    }

    fn arb_layout() -> impl Strategy<Value = LayoutNodeConfig> {
        let leaf = (0usize..6).prop_map(|i| LayoutNodeConfig::camera(format!("c{i}")));
        leaf.prop_recursive(4, 24, 4, |inner| {
            (any::<bool>(), prop::collection::vec(inner, 2..5)).prop_map(
                |(horizontal, children)| {
                    if horizontal {
                        LayoutNodeConfig::horizontal(children)
                    } else {
                        LayoutNodeConfig::vertical(children)
                    }
                },
            )
        })
    }

    fn arb_sizes() -> impl Strategy<Value = HashMap<String, Size>> {
        prop::collection::vec((16u32..2160, 16u32..3840), 6).prop_map(|dims| {
            dims.into_iter()
                .enumerate()
                .map(|(i, (h, w))| (format!("c{i}"), Size::new(h, w)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_two_leaves_share_perpendicular_dimension(
            a in (1u32..4000, 1u32..4000),
            b in (1u32..4000, 1u32..4000),
            horizontal in any::<bool>(),
        ) {
            let children = vec![cam("a"), cam("b")];
            let config = if horizontal {
                LayoutNodeConfig::horizontal(children)
            } else {
                LayoutNodeConfig::vertical(children)
            };
            let camera_sizes = sizes([("a", a.0, a.1), ("b", b.0, b.1)]);
            let (root, targets) = compute_layout(&config, &camera_sizes, "p").unwrap();

            let (ta, tb) = (targets["a"], targets["b"]);
            if horizontal {
                prop_assert_eq!(ta.height, tb.height);
                prop_assert_eq!(ta.height, a.0.min(b.0));
                prop_assert_eq!(root.size().width, ta.width + tb.width);
            } else {
                prop_assert_eq!(ta.width, tb.width);
                prop_assert_eq!(ta.width, a.1.min(b.1));
                prop_assert_eq!(root.size().height, ta.height + tb.height);
            }

            // The smaller side is untouched.
            if (horizontal && a.0 <= b.0) || (!horizontal && a.1 <= b.1) {
                prop_assert_eq!(ta, Size::new(a.0, a.1));
            } else {
                prop_assert_eq!(tb, Size::new(b.0, b.1));
            }
        }

        #[test]
        fn prop_built_trees_are_consistent(config in arb_layout(), camera_sizes in arb_sizes()) {
            let (root, targets) = compute_layout(&config, &camera_sizes, "p").unwrap();
            assert_consistent(&root);

            // Cameras that appear once have their leaf size recorded.
            let mut leaves = Vec::new();
            leaf_sizes(&root, &mut leaves);
            for (camera, size) in &leaves {
                if leaves.iter().filter(|(c, _)| c == camera).count() == 1 {
                    prop_assert_eq!(targets[camera], *size);
                }
            }
        }
    }
}
