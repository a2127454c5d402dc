//! Per-camera decorations: centermark, border, and stacked text overlays.
//!
//! Overlay text, color and visibility are pure functions of the overlay
//! definition and the sensor snapshot, so results are memoized per
//! (overlay id, sensor fingerprint) in an [`OverlayCache`] owned by the
//! renderer.

use std::num::NonZeroUsize;

use image::RgbImage;
use lru::LruCache;
use multiview_model::{
    BorderConfig, CentermarkConfig, Color, OverlayStyle, SensorFingerprint, SensorSnapshot,
    TextOverlayConfig, ViewerConfig,
};
use multiview_processing::{build_context, evaluate_color_rules, evaluate_condition, render_template};

use crate::draw::Painter;

/// Color used when an overlay defines neither a static color nor rules.
pub const DEFAULT_TEXT_COLOR: Color = Color::WHITE;

/// Resolved result for one overlay under one sensor snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOverlay {
    pub text: String,
    pub color: Color,
    pub visible: bool,
}

impl RenderedOverlay {
    fn hidden() -> Self {
        Self {
            text: String::new(),
            color: DEFAULT_TEXT_COLOR,
            visible: false,
        }
    }
}

/// Resolve an overlay against a sensor snapshot, without caching.
pub fn evaluate_overlay(overlay: &TextOverlayConfig, sensor: &SensorSnapshot) -> RenderedOverlay {
    let context = build_context(sensor.to_context(), &overlay.variables);

    let visible = overlay
        .visible_when
        .as_deref()
        .map_or(true, |condition| evaluate_condition(condition, &context));
    if !visible {
        return RenderedOverlay::hidden();
    }

    let text = render_template(&overlay.template, &context);
    let color = match overlay.color {
        Some(color) => color,
        None => evaluate_color_rules(&overlay.color_rules, &context, DEFAULT_TEXT_COLOR),
    };

    RenderedOverlay {
        text,
        color,
        visible: true,
    }
}

/// Hit/miss counters for an [`OverlayCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type CacheKey = (String, SensorFingerprint);

/// Memoized overlay results.
///
/// Unbounded unless built with a capacity, in which case the least recently
/// used entries are evicted.
pub struct OverlayCache {
    entries: LruCache<CacheKey, RenderedOverlay>,
    stats: CacheStats,
}

impl OverlayCache {
    pub fn unbounded() -> Self {
        Self {
            entries: LruCache::unbounded(),
            stats: CacheStats::default(),
        }
    }

    /// A cache holding at most `capacity` entries (at least one).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            stats: CacheStats::default(),
        }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        capacity.map_or_else(Self::unbounded, Self::bounded)
    }

    /// Cached result for `overlay` under `sensor`, computing it on a miss.
    pub fn get_or_compute(
        &mut self,
        overlay: &TextOverlayConfig,
        sensor: &SensorSnapshot,
    ) -> RenderedOverlay {
        let key = (overlay.id.clone(), sensor.fingerprint().clone());
        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            return hit.clone();
        }

        self.stats.misses += 1;
        tracing::debug!(overlay = %overlay.id, "Overlay cache miss");
        let rendered = evaluate_overlay(overlay, sensor);
        self.entries.put(key, rendered.clone());
        rendered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for OverlayCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for OverlayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Draws decorations on individual camera tiles.
#[derive(Debug)]
pub struct OverlayRenderer {
    overlays: Vec<TextOverlayConfig>,
    default_style: OverlayStyle,
    centermark: CentermarkConfig,
    border: BorderConfig,
    cache: OverlayCache,
}

impl OverlayRenderer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            overlays: config.text_overlays.clone(),
            default_style: config.default_overlay_style.clone(),
            centermark: config.centermark.clone(),
            border: config.border.clone(),
            cache: OverlayCache::with_capacity(config.overlay_cache_capacity),
        }
    }

    pub fn overlays(&self) -> &[TextOverlayConfig] {
        &self.overlays
    }

    /// Decorate one camera tile.
    ///
    /// The centermark is drawn when `centermark` is requested and enabled,
    /// the border whenever it is enabled. Text overlays targeting `camera`
    /// are stacked from the top only when `with_text` is set.
    pub fn decorate(
        &mut self,
        image: &mut RgbImage,
        camera: &str,
        centermark: bool,
        with_text: bool,
        sensor: &SensorSnapshot,
        painter: &dyn Painter,
    ) {
        if centermark {
            draw_centermark(image, &self.centermark, painter);
        }
        draw_border(image, &self.border, painter);

        if !with_text {
            return;
        }

        let mut y_offset = 0;
        for overlay in self.overlays.iter().filter(|o| o.targets(camera)) {
            let rendered = self.cache.get_or_compute(overlay, sensor);
            if !rendered.visible {
                continue;
            }
            let style = overlay.style.as_ref().unwrap_or(&self.default_style);
            y_offset = draw_text_box(image, &rendered.text, y_offset, rendered.color, style, painter);
        }
    }

    /// Resolve an overlay by id through the cache.
    pub fn render(&mut self, overlay_id: &str, sensor: &SensorSnapshot) -> Option<RenderedOverlay> {
        let overlay = self.overlays.iter().find(|o| o.id == overlay_id)?;
        Some(self.cache.get_or_compute(overlay, sensor))
    }

    pub fn cache(&self) -> &OverlayCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Background box plus text at `y_offset`. Returns the offset below the box.
pub fn draw_text_box(
    image: &mut RgbImage,
    text: &str,
    y_offset: i32,
    color: Color,
    style: &OverlayStyle,
    painter: &dyn Painter,
) -> i32 {
    painter.fill_rect(
        image,
        0,
        y_offset,
        image.width(),
        style.box_height,
        style.background_color,
    );
    painter.text(
        image,
        text,
        (style.padding_left as i32, y_offset + style.padding_top as i32),
        style,
        color,
    );
    y_offset + style.box_height as i32
}

/// Crosshair at the image center; arm length is a fraction of the width.
pub fn draw_centermark(image: &mut RgbImage, config: &CentermarkConfig, painter: &dyn Painter) {
    if !config.enabled {
        return;
    }
    let (w, h) = (image.width() as i32, image.height() as i32);
    let (cx, cy) = (w / 2, h / 2);
    let arm = (w as f64 * config.size_ratio) as i32;

    painter.line(image, (cx - arm, cy), (cx + arm, cy), config.thickness, config.color);
    painter.line(image, (cx, cy - arm), (cx, cy + arm), config.thickness, config.color);
}

/// Outline along the image edges, `thickness` pixels wide.
pub fn draw_border(image: &mut RgbImage, config: &BorderConfig, painter: &dyn Painter) {
    if !config.enabled || config.thickness == 0 {
        return;
    }
    let (w, h) = (image.width(), image.height());
    let t = config.thickness.min(w).min(h);

    painter.fill_rect(image, 0, 0, w, t, config.color);
    painter.fill_rect(image, 0, (h - t) as i32, w, t, config.color);
    painter.fill_rect(image, 0, 0, t, h, config.color);
    painter.fill_rect(image, (w - t) as i32, 0, t, h, config.color);
}
