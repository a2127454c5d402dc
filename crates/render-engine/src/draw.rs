//! Drawing primitives used by the overlay renderer.
//!
//! The renderer computes geometry, text and colors; a [`Painter`] turns them
//! into pixels. [`ImagePainter`] is the default implementation on top of
//! `imageproc`.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use multiview_common::{ComposerError, ComposerResult};
use multiview_model::{Color, OverlayStyle};

/// Pixel height of text drawn at `font_scale == 1.0`.
pub const BASE_TEXT_PX: f32 = 30.0;

/// In-place drawing on camera tiles.
pub trait Painter {
    /// Fill a rectangle; parts outside the image are clipped.
    fn fill_rect(&self, image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Color);

    /// Straight line of the given thickness.
    fn line(&self, image: &mut RgbImage, from: (i32, i32), to: (i32, i32), thickness: u32, color: Color);

    /// Text whose baseline starts at `origin`.
    fn text(&self, image: &mut RgbImage, text: &str, origin: (i32, i32), style: &OverlayStyle, color: Color);
}

/// `imageproc`-backed painter with a registry of named fonts.
///
/// Styles name their font; unknown names fall back to the first registered
/// font. Without any font, text is skipped and a warning is logged once.
#[derive(Clone, Default)]
pub struct ImagePainter {
    fonts: HashMap<String, FontArc>,
    fallback: Option<FontArc>,
    missing_font_reported: Cell<bool>,
}

impl ImagePainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font under `name`.
    pub fn with_font(mut self, name: impl Into<String>, font: FontArc) -> Self {
        self.register_font(name, font);
        self
    }

    pub fn register_font(&mut self, name: impl Into<String>, font: FontArc) {
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.fonts.insert(name.into(), font);
    }

    /// Load a TrueType/OpenType file and register it under `name`.
    pub fn load_font(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> ComposerResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ComposerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            ComposerError::render(format!("invalid font {}: {e}", path.display()))
        })?;
        let name = name.into();
        tracing::info!(font = %name, path = %path.display(), "Registered font");
        self.register_font(name, font);
        Ok(())
    }

    pub fn has_fonts(&self) -> bool {
        self.fallback.is_some()
    }

    fn font_for(&self, name: &str) -> Option<&FontArc> {
        self.fonts.get(name).or(self.fallback.as_ref())
    }
}

impl std::fmt::Debug for ImagePainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePainter")
            .field("fonts", &self.fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Painter for ImagePainter {
    fn fill_rect(&self, image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Color) {
        if width == 0 || height == 0 {
            return;
        }
        draw_filled_rect_mut(image, Rect::at(x, y).of_size(width, height), Rgb(color.0));
    }

    fn line(&self, image: &mut RgbImage, from: (i32, i32), to: (i32, i32), thickness: u32, color: Color) {
        let (dx, dy) = ((to.0 - from.0) as f32, (to.1 - from.1) as f32);
        let length = (dx * dx + dy * dy).sqrt().max(1.0);
        let (nx, ny) = (-dy / length, dx / length);

        // Parallel strokes centered on the requested segment.
        let strokes = thickness.max(1);
        let center = (strokes as f32 - 1.0) / 2.0;
        for i in 0..strokes {
            let offset = i as f32 - center;
            draw_line_segment_mut(
                image,
                (from.0 as f32 + nx * offset, from.1 as f32 + ny * offset),
                (to.0 as f32 + nx * offset, to.1 as f32 + ny * offset),
                Rgb(color.0),
            );
        }
    }

    fn text(&self, image: &mut RgbImage, text: &str, origin: (i32, i32), style: &OverlayStyle, color: Color) {
        if text.is_empty() {
            return;
        }
        let Some(font) = self.font_for(&style.font) else {
            if !self.missing_font_reported.replace(true) {
                tracing::warn!(
                    font = %style.font,
                    "No font registered; overlay text is not drawn until one is loaded"
                );
            }
            return;
        };

        let scale = PxScale::from(style.font_scale * BASE_TEXT_PX);
        let ascent = font.as_scaled(scale).ascent().round() as i32;
        let top = origin.1 - ascent;

        // Heavier strokes are approximated by horizontal re-draws.
        let extra = style.thickness.saturating_sub(1).min(2) as i32;
        for dx in 0..=extra {
            draw_text_mut(image, Rgb(color.0), origin.0 + dx, top, scale, font, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips_to_image() {
        let mut img = RgbImage::new(4, 4);
        ImagePainter::new().fill_rect(&mut img, 2, 2, 10, 10, Color::WHITE);
        assert_eq!(img.get_pixel(3, 3), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_zero_sized_rect_is_ignored() {
        let mut img = RgbImage::new(2, 2);
        ImagePainter::new().fill_rect(&mut img, 0, 0, 0, 2, Color::WHITE);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_thick_horizontal_line() {
        let mut img = RgbImage::new(10, 10);
        ImagePainter::new().line(&mut img, (1, 5), (8, 5), 3, Color::MAGENTA);
        for y in 4..=6 {
            assert_eq!(img.get_pixel(5, y), &Rgb([255, 0, 255]), "row {y}");
        }
        assert_eq!(img.get_pixel(5, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut img = RgbImage::new(20, 20);
        let painter = ImagePainter::new();
        assert!(!painter.has_fonts());
        assert!(!painter.missing_font_reported.get());
        painter.text(&mut img, "hello", (0, 15), &OverlayStyle::default(), Color::WHITE);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
        assert!(painter.missing_font_reported.get());
    }

    #[test]
    fn test_missing_font_reported_only_for_text() {
        let mut img = RgbImage::new(20, 20);
        let painter = ImagePainter::new();
        painter.text(&mut img, "", (0, 15), &OverlayStyle::default(), Color::WHITE);
        painter.fill_rect(&mut img, 0, 0, 4, 4, Color::WHITE);
        assert!(!painter.missing_font_reported.get());
    }

    #[test]
    fn test_missing_font_file() {
        let mut painter = ImagePainter::new();
        let err = painter
            .load_font("mono", "/nonexistent/font.ttf")
            .unwrap_err();
        assert!(matches!(err, ComposerError::FileNotFound { .. }));
    }
}
