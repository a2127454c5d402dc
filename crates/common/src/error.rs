//! Error types shared across Multiview crates.

use std::path::PathBuf;

/// Top-level error type for Multiview operations.
///
/// Only structural problems surface here. Expression and template failures
/// inside overlays degrade to safe defaults and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ComposerError.
pub type ComposerResult<T> = Result<T, ComposerError>;

impl ComposerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }
}
