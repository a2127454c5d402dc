//! Runtime camera state and buffer preparation.

use image::imageops::{self, FilterType};
use image::RgbImage;
use multiview_model::{CameraDefinition, Rotation, Size};

/// Runtime state for one camera referenced by a layout.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub name: String,

    /// Nominal resolution as delivered, before rotation.
    pub resolution: Size,

    /// Rotation applied to each incoming buffer.
    pub rotation: Rotation,

    /// Whether the centermark is drawn on this camera.
    pub centermark: bool,

    /// Target size per layout index.
    pub target_sizes: Vec<Size>,

    /// Whether the camera currently delivers frames.
    pub active: bool,

    /// Last buffer received, as delivered (not rotated).
    pub raw_image: Option<RgbImage>,
}

impl CameraState {
    pub fn new(name: impl Into<String>, definition: &CameraDefinition, layout_count: usize) -> Self {
        let effective = definition.effective_resolution();
        Self {
            name: name.into(),
            resolution: definition.resolution,
            rotation: definition.rotation(),
            centermark: definition.centermark,
            target_sizes: vec![effective; layout_count],
            active: false,
            raw_image: None,
        }
    }

    /// Resolution after rotation; this is what layout sizing uses.
    pub fn effective_resolution(&self) -> Size {
        if self.rotation.is_quarter_turn() {
            self.resolution.transposed()
        } else {
            self.resolution
        }
    }

    pub fn target_size(&self, layout_index: usize) -> Size {
        self.target_sizes
            .get(layout_index)
            .copied()
            .unwrap_or(Size::DEFAULT_CAMERA)
    }

    pub fn update(&mut self, image: RgbImage, active: bool) {
        self.raw_image = Some(image);
        self.active = active;
    }

    /// Drop the buffer and mark the camera inactive.
    pub fn release(&mut self) {
        self.raw_image = None;
        self.active = false;
    }

    /// The current buffer rotated and conformed to `target`, or `None` when
    /// the camera is inactive or has not delivered a frame yet.
    pub fn prepare(&self, target: Size) -> Option<RgbImage> {
        if !self.active {
            return None;
        }
        let raw = self.raw_image.as_ref()?;
        Some(conform(rotate(raw, self.rotation), target))
    }
}

/// Rotate a buffer. Quarter turns swap its dimensions.
pub fn rotate(image: &RgbImage, rotation: Rotation) -> RgbImage {
    match rotation {
        Rotation::None => image.clone(),
        Rotation::Clockwise90 => imageops::rotate90(image),
        Rotation::Rotate180 => imageops::rotate180(image),
        Rotation::CounterClockwise90 => imageops::rotate270(image),
    }
}

/// Resize (bilinear) only when the buffer does not already match `target`.
pub fn conform(image: RgbImage, target: Size) -> RgbImage {
    if image.height() == target.height && image.width() == target.width {
        return image;
    }
    if target.height == 0 || target.width == 0 {
        return create_placeholder(target);
    }
    tracing::trace!(
        from = %Size::new(image.height(), image.width()),
        to = %target,
        "Resizing camera buffer"
    );
    imageops::resize(&image, target.width, target.height, FilterType::Triangle)
}

/// A black buffer of the given size.
pub fn create_placeholder(size: Size) -> RgbImage {
    RgbImage::new(size.width, size.height)
}
