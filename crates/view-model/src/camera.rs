//! Camera definitions and pixel geometry.

use serde::{Deserialize, Serialize};

/// Pixel dimensions, always `height` first to match buffer shape order.
///
/// Serialized as a `[height, width]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Size {
    pub height: u32,
    pub width: u32,
}

impl Size {
    /// Size assumed for cameras that are referenced but never defined.
    pub const DEFAULT_CAMERA: Size = Size {
        height: 480,
        width: 640,
    };

    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Swap the axes (what a quarter-turn rotation does to a buffer).
    pub fn transposed(self) -> Self {
        Self {
            height: self.width,
            width: self.height,
        }
    }

    pub fn area(&self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

impl From<[u32; 2]> for Size {
    fn from([height, width]: [u32; 2]) -> Self {
        Self { height, width }
    }
}

impl From<Size> for [u32; 2] {
    fn from(size: Size) -> Self {
        [size.height, size.width]
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Rotation applied to incoming camera buffers.
///
/// Serialized as degrees: `0`, `90`, `180`, `270` (or `-90`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Rotate180,
    CounterClockwise90,
}

impl Rotation {
    /// Whether the rotation swaps height and width.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::CounterClockwise90)
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::CounterClockwise90 => 270,
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Rotate180),
            270 | -90 => Ok(Rotation::CounterClockwise90),
            other => Err(format!(
                "rotation must be one of 0, 90, 180, 270, -90; got {other}"
            )),
        }
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Definition of a camera from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefinition {
    /// Nominal resolution as delivered by the camera, before rotation.
    pub resolution: Size,

    /// Rotation applied to each incoming buffer.
    pub rotate: Option<Rotation>,

    /// Whether to draw the crosshair centermark on this camera.
    pub centermark: bool,
}

impl Default for CameraDefinition {
    fn default() -> Self {
        Self {
            resolution: Size::DEFAULT_CAMERA,
            rotate: None,
            centermark: false,
        }
    }
}

impl CameraDefinition {
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            resolution: Size::new(height, width),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotate = Some(rotation);
        self
    }

    pub fn rotation(&self) -> Rotation {
        self.rotate.unwrap_or_default()
    }

    /// Resolution after rotation; this is what layout sizing sees.
    pub fn effective_resolution(&self) -> Size {
        if self.rotation().is_quarter_turn() {
            self.resolution.transposed()
        } else {
            self.resolution
        }
    }
}
