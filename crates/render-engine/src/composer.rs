//! The multi-camera composer.
//!
//! Owns camera buffers, the sensor snapshot and the overlay renderer, and
//! turns them into one composed frame per configured layout. The composer
//! is driven by a single caller (update cameras, update sensors, generate);
//! hosts that share it across threads must serialize access themselves.

use std::collections::HashMap;
use std::path::Path;

use image::RgbImage;
use multiview_common::{ComposerError, ComposerResult};
use multiview_model::{
    load_config, CameraDefinition, ConfigError, SensorSnapshot, Size, Value, ViewerConfig,
};
use multiview_processing::{LayoutError, LayoutManager};

use crate::camera::{create_placeholder, CameraState};
use crate::compositor::concatenate;
use crate::draw::{ImagePainter, Painter};
use crate::overlay::OverlayRenderer;

/// Composes camera feeds into multi-view frames.
pub struct MultiViewComposer {
    config: ViewerConfig,
    cameras: Vec<CameraState>,
    camera_index: HashMap<String, usize>,
    layouts: LayoutManager,
    sensor: SensorSnapshot,
    renderer: OverlayRenderer,
    painter: Box<dyn Painter>,
    shut_down: bool,
}

impl MultiViewComposer {
    /// Build cameras and layouts from a loaded configuration.
    ///
    /// The default painter has no fonts: overlay boxes are drawn but their
    /// text is skipped (with a one-time warning). Register a font through
    /// [`ImagePainter::load_font`] and pass it to [`Self::with_painter`].
    pub fn new(config: ViewerConfig) -> ComposerResult<Self> {
        let referenced = config.referenced_cameras();

        let camera_sizes: HashMap<String, Size> = config
            .cameras
            .iter()
            .map(|(name, def)| (name.to_string(), def.effective_resolution()))
            .collect();

        let layouts = LayoutManager::new(
            &config.layouts,
            &camera_sizes,
            config.active_layout.as_deref(),
        )
        .map_err(layout_error)?;

        let fallback = CameraDefinition::default();
        let mut cameras = Vec::with_capacity(referenced.len());
        let mut camera_index = HashMap::with_capacity(referenced.len());
        for name in referenced {
            let definition = config.cameras.get(&name).unwrap_or_else(|| {
                tracing::warn!(camera = %name, "Camera used in a layout has no definition; using defaults");
                &fallback
            });
            let mut state = CameraState::new(name.as_str(), definition, layouts.len());
            for (index, target) in state.target_sizes.iter_mut().enumerate() {
                *target = layouts.target_size(&name, index);
            }
            camera_index.insert(name, cameras.len());
            cameras.push(state);
        }

        for name in config.cameras.keys() {
            if !camera_index.contains_key(name) {
                tracing::debug!(camera = name, "Camera not used by any layout; skipping");
            }
        }

        let sensor: SensorSnapshot = config
            .initial_dynamic_data
            .iter()
            .map(|(k, v)| (k, v.clone()))
            .collect();

        let renderer = OverlayRenderer::new(&config);

        tracing::info!(
            cameras = cameras.len(),
            layouts = layouts.len(),
            overlays = config.text_overlays.len(),
            active_layout = layouts.names().get(layouts.active_index()).map_or("", String::as_str),
            "Composer initialized"
        );

        Ok(Self {
            config,
            cameras,
            camera_index,
            layouts,
            sensor,
            renderer,
            painter: Box::new(ImagePainter::new()),
            shut_down: false,
        })
    }

    /// Load a configuration file and build the composer from it.
    pub fn from_path(path: impl AsRef<Path>) -> ComposerResult<Self> {
        let config = load_config(path).map_err(config_error)?;
        Self::new(config)
    }

    /// Replace the drawing collaborator.
    pub fn with_painter(mut self, painter: impl Painter + 'static) -> Self {
        self.painter = Box::new(painter);
        self
    }

    /// Store a new buffer for `name`. Returns `false` for unknown cameras.
    pub fn update_camera_image(&mut self, name: &str, image: RgbImage, active: bool) -> bool {
        match self.camera_mut(name) {
            Some(camera) => {
                camera.update(image, active);
                true
            }
            None => {
                tracing::warn!(camera = name, "Update for unknown camera ignored");
                false
            }
        }
    }

    /// Toggle whether a camera is considered live. Returns `false` for
    /// unknown cameras.
    pub fn set_camera_active(&mut self, name: &str, active: bool) -> bool {
        match self.camera_mut(name) {
            Some(camera) => {
                camera.active = active;
                true
            }
            None => false,
        }
    }

    /// Merge sensor fields into the snapshot.
    pub fn update_dynamic_data<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.sensor.update(fields);
    }

    pub fn sensor_data(&self) -> &SensorSnapshot {
        &self.sensor
    }

    /// One composed frame per configured layout, in declaration order.
    pub fn generate_frame(&mut self) -> Vec<RgbImage> {
        (0..self.layouts.len())
            .filter_map(|index| self.generate_layout_frame(index))
            .collect()
    }

    /// The composed frame for layout `index`, or `None` if out of range.
    pub fn generate_layout_frame(&mut self, index: usize) -> Option<RgbImage> {
        let root = self.layouts.root(index)?;
        let with_text = index == self.layouts.active_index();

        let cameras = &self.cameras;
        let camera_index = &self.camera_index;
        let layouts = &self.layouts;
        let sensor = &self.sensor;
        let renderer = &mut self.renderer;
        let painter = self.painter.as_ref();

        let mut accessor = |name: &str| -> RgbImage {
            let Some(camera) = camera_index.get(name).map(|&i| &cameras[i]) else {
                return create_placeholder(layouts.target_size(name, index));
            };
            let target = camera.target_size(index);
            match camera.prepare(target) {
                Some(mut image) => {
                    renderer.decorate(&mut image, name, camera.centermark, with_text, sensor, painter);
                    image
                }
                None => create_placeholder(target),
            }
        };

        Some(concatenate(root, &mut accessor))
    }

    /// Names of instantiated cameras, in first-use order.
    pub fn camera_names(&self) -> Vec<&str> {
        self.cameras.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn camera_config(&self, name: &str) -> Option<&CameraState> {
        self.camera_index.get(name).map(|&i| &self.cameras[i])
    }

    pub fn layouts(&self) -> &LayoutManager {
        &self.layouts
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut OverlayRenderer {
        &mut self.renderer
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Release camera buffers and clear the overlay cache. Safe to call
    /// more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        for camera in &mut self.cameras {
            camera.release();
        }
        let stats = self.renderer.cache().stats();
        self.renderer.clear_cache();
        self.shut_down = true;
        tracing::info!(
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "Composer shut down"
        );
    }

    fn camera_mut(&mut self, name: &str) -> Option<&mut CameraState> {
        let index = *self.camera_index.get(name)?;
        self.cameras.get_mut(index)
    }
}

impl std::fmt::Debug for MultiViewComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiViewComposer")
            .field("cameras", &self.camera_names())
            .field("layouts", &self.layouts.names())
            .field("sensor_fields", &self.sensor.len())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

fn layout_error(err: LayoutError) -> ComposerError {
    match err {
        LayoutError::NoLayouts => ComposerError::config("No layouts defined in configuration"),
        other => ComposerError::layout(other.to_string()),
    }
}

fn config_error(err: ConfigError) -> ComposerError {
    match err {
        ConfigError::NotFound { path } => ComposerError::FileNotFound { path },
        other => ComposerError::config(other.to_string()),
    }
}
