//! Layout tree configuration.
//!
//! A layout is an n-ary tree: leaves name a camera, junctions concatenate
//! their children along one direction. The processing crate folds this into a
//! strictly binary, sized tree.

use serde::{Deserialize, Serialize};

/// Concatenation direction of a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Children are stacked top to bottom; widths must agree.
    Vertical,
    /// Children are placed left to right; heights must agree.
    Horizontal,
}

/// One node of a configured layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutNodeConfig {
    Camera {
        camera: String,
    },
    Junction {
        direction: Direction,
        children: Vec<LayoutNodeConfig>,
    },
}

impl LayoutNodeConfig {
    pub fn camera(name: impl Into<String>) -> Self {
        Self::Camera {
            camera: name.into(),
        }
    }

    pub fn horizontal(children: Vec<LayoutNodeConfig>) -> Self {
        Self::Junction {
            direction: Direction::Horizontal,
            children,
        }
    }

    pub fn vertical(children: Vec<LayoutNodeConfig>) -> Self {
        Self::Junction {
            direction: Direction::Vertical,
            children,
        }
    }

    /// Camera names in depth-first, left-to-right order (duplicates kept).
    pub fn cameras(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_cameras(&mut out);
        out
    }

    fn collect_cameras<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Camera { camera } => out.push(camera),
            Self::Junction { children, .. } => {
                for child in children {
                    child.collect_cameras(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_node_parsing() {
        let node: LayoutNodeConfig = serde_json::from_str(
            r#"{
                "direction": "horizontal",
                "children": [
                    {"camera": "left"},
                    {"direction": "vertical", "children": [{"camera": "top"}, {"camera": "bottom"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            node,
            LayoutNodeConfig::horizontal(vec![
                LayoutNodeConfig::camera("left"),
                LayoutNodeConfig::vertical(vec![
                    LayoutNodeConfig::camera("top"),
                    LayoutNodeConfig::camera("bottom"),
                ]),
            ])
        );
        assert_eq!(node.cameras(), vec!["left", "top", "bottom"]);
    }
}
