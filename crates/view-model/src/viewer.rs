//! Top-level viewer configuration and its loader.
//!
//! Loading validates the raw JSON document before typed deserialization so
//! that structural mistakes are reported with a path into the document
//! (`layouts.main.children[1]: ...`) instead of a generic serde message.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::camera::CameraDefinition;
use crate::layout::LayoutNodeConfig;
use crate::ordered::OrderedMap;
use crate::overlay::{BorderConfig, CentermarkConfig, OverlayStyle, TextOverlayConfig};
use crate::value::Value;

/// Main configuration for the composer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Camera definitions. Cameras not referenced by any layout are ignored.
    pub cameras: OrderedMap<CameraDefinition>,

    pub default_overlay_style: OverlayStyle,
    pub text_overlays: Vec<TextOverlayConfig>,
    pub centermark: CentermarkConfig,
    pub border: BorderConfig,

    /// Named layouts. Declaration order defines layout indices.
    pub layouts: OrderedMap<LayoutNodeConfig>,

    /// Layout that receives text overlays. Defaults to the first layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_layout: Option<String>,

    /// Dynamic values present before the first update.
    pub initial_dynamic_data: OrderedMap<Value>,

    /// Upper bound on memoized overlay results. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_cache_capacity: Option<usize>,
}

impl ViewerConfig {
    /// Index of the active layout; falls back to the first layout when the
    /// name is absent or unknown.
    pub fn active_layout_index(&self) -> usize {
        self.active_layout
            .as_deref()
            .and_then(|name| self.layouts.index_of(name))
            .unwrap_or(0)
    }

    /// Cameras referenced by any layout, in first-appearance order.
    pub fn referenced_cameras(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for layout in self.layouts.values() {
            for camera in layout.cameras() {
                if !names.iter().any(|n| n == camera) {
                    names.push(camera.to_string());
                }
            }
        }
        names
    }

    /// Parse and validate a configuration from JSON text.
    ///
    /// `origin` is only used in error messages.
    pub fn from_json_str(content: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let origin = origin.as_ref();
        let document: Json = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: e,
        })?;

        if document.is_null() {
            return Err(ConfigError::Empty {
                path: origin.to_path_buf(),
            });
        }
        validate_document(&document)?;

        // Typed parse straight from the text so map order is never
        // round-tripped through `Json`.
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: e,
        })
    }
}

/// Load configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ViewerConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Err(ConfigError::Empty {
            path: path.to_path_buf(),
        });
    }

    let config = ViewerConfig::from_json_str(&content, path)?;
    tracing::info!(
        path = %path.display(),
        layouts = config.layouts.len(),
        cameras = config.cameras.len(),
        overlays = config.text_overlays.len(),
        "Loaded viewer config"
    );
    Ok(config)
}

/// Structural validation of a raw configuration document.
pub fn validate_document(document: &Json) -> Result<(), ConfigError> {
    let root = document
        .as_object()
        .ok_or_else(|| invalid("", format!("must be a mapping, got {}", json_kind(document))))?;

    let layouts = match root.get("layouts").and_then(Json::as_object) {
        Some(layouts) if !layouts.is_empty() => layouts,
        _ => {
            return Err(invalid(
                "layouts",
                "configuration must define at least one layout",
            ))
        }
    };

    for (name, node) in layouts {
        validate_layout_node(node, &format!("layouts.{name}"))?;
    }

    if let Some(active) = root.get("active_layout").filter(|v| !v.is_null()) {
        let active = active
            .as_str()
            .ok_or_else(|| invalid("active_layout", "must be a string"))?;
        if !layouts.contains_key(active) {
            let available = layouts.keys().cloned().collect::<Vec<_>>().join(", ");
            return Err(invalid(
                "active_layout",
                format!("'{active}' not found. Available layouts: {available}"),
            ));
        }
    }

    if let Some(cameras) = root.get("cameras") {
        let cameras = cameras
            .as_object()
            .ok_or_else(|| invalid("cameras", "must be a mapping"))?;
        for (name, camera) in cameras {
            validate_camera(camera, &format!("cameras.{name}"))?;
        }
    }

    if let Some(overlays) = root.get("text_overlays") {
        let overlays = overlays
            .as_array()
            .ok_or_else(|| invalid("text_overlays", "must be a list"))?;
        for (i, overlay) in overlays.iter().enumerate() {
            validate_text_overlay(overlay, &format!("text_overlays[{i}]"))?;
        }
    }

    Ok(())
}

fn validate_layout_node(node: &Json, path: &str) -> Result<(), ConfigError> {
    let node = node
        .as_object()
        .ok_or_else(|| invalid(path, "layout node must be a mapping"))?;

    if let Some(camera) = node.get("camera") {
        if !camera.is_string() {
            return Err(invalid(format!("{path}.camera"), "must be a string"));
        }
        return Ok(());
    }

    let direction = node.get("direction").ok_or_else(|| {
        invalid(
            path,
            "junction node must have 'direction' (horizontal or vertical)",
        )
    })?;
    match direction.as_str() {
        Some("horizontal") | Some("vertical") => {}
        _ => {
            return Err(invalid(
                format!("{path}.direction"),
                format!("must be 'horizontal' or 'vertical', got {direction}"),
            ))
        }
    }

    let children = match node.get("children").and_then(Json::as_array) {
        Some(children) if !children.is_empty() => children,
        _ => return Err(invalid(path, "junction node must have 'children' list")),
    };
    if children.len() < 2 {
        return Err(invalid(
            format!("{path}.children"),
            "must have at least 2 children",
        ));
    }

    for (i, child) in children.iter().enumerate() {
        validate_layout_node(child, &format!("{path}.children[{i}]"))?;
    }
    Ok(())
}

fn validate_camera(camera: &Json, path: &str) -> Result<(), ConfigError> {
    let camera = camera
        .as_object()
        .ok_or_else(|| invalid(path, "camera definition must be a mapping"))?;

    if let Some(resolution) = camera.get("resolution") {
        let valid = resolution
            .as_array()
            .filter(|dims| dims.len() == 2)
            .map(|dims| dims.iter().all(|d| d.as_u64().is_some_and(|d| d > 0)))
            .unwrap_or(false);
        if !valid {
            return Err(invalid(
                format!("{path}.resolution"),
                "must be [height, width] with positive integers",
            ));
        }
    }

    if let Some(rotate) = camera.get("rotate").filter(|v| !v.is_null()) {
        if !matches!(rotate.as_i64(), Some(0 | 90 | 180 | 270 | -90)) {
            return Err(invalid(
                format!("{path}.rotate"),
                format!("must be one of 0, 90, 180, 270, -90; got {rotate}"),
            ));
        }
    }
    Ok(())
}

fn validate_text_overlay(overlay: &Json, path: &str) -> Result<(), ConfigError> {
    let overlay = overlay
        .as_object()
        .ok_or_else(|| invalid(path, "text overlay must be a mapping"))?;

    if !overlay.contains_key("id") {
        return Err(invalid(path, "text overlay must have 'id'"));
    }
    if !overlay.contains_key("template") {
        return Err(invalid(path, "text overlay must have 'template'"));
    }
    Ok(())
}

fn invalid(path: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        path: path.into(),
        message: message.into(),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "list",
        Json::Object(_) => "mapping",
    }
}

/// Errors that can occur while loading a viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Configuration file is empty: {path}")]
    Empty { path: PathBuf },

    #[error("{}", format_validation(path, message))]
    Validation { path: String, message: String },
}

fn format_validation(path: &str, message: &str) -> String {
    if path.is_empty() {
        format!("Configuration {message}")
    } else {
        format!("{path}: {message}")
    }
}
