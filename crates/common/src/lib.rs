//! Multiview Common Utilities
//!
//! Shared infrastructure for all Multiview crates:
//! - Error types and result aliases
//! - Frame clock and tick-rate utilities for the composition loop
//! - Tracing/logging initialization
//! - Application configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
