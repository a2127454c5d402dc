//! Multiview Render Engine
//!
//! Pixel side of the composer: camera buffers in, composed frames out.
//!
//! # Pipeline
//!
//! ```text
//! camera buffer ── rotate ── conform to target size ──┐
//!                                                     ├── centermark / border / text overlays
//! sensor snapshot ── overlay cache ───────────────────┘         │
//!                                                               ▼
//! layout tree ─────────────────────────────── concatenate leaves (one frame per layout)
//! ```
//!
//! Sizing is decided once when layouts are built; per-frame work is copying
//! pixels plus resizing buffers that arrive at an unexpected size.

pub mod camera;
pub mod composer;
pub mod compositor;
pub mod draw;
pub mod overlay;

pub use camera::{create_placeholder, CameraState};
pub use composer::MultiViewComposer;
pub use compositor::concatenate;
pub use draw::{ImagePainter, Painter};
pub use overlay::{CacheStats, OverlayCache, OverlayRenderer, RenderedOverlay};
