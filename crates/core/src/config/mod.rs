//! Configuration for the aggregation engine.
//!
//! Two layers: process-wide `Settings` loaded once from TOML + environment,
//! and the per-request `UserConfig` decoded by the transport layer and
//! sanitized here before it reaches any component.

mod loader;
mod types;

pub use loader::{load_settings, load_settings_from_str};
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}
