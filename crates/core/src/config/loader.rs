use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Settings, ConfigError};

/// Load settings from a TOML file with environment variable overrides.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let settings: Settings = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("MAGNETAR_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(settings)
}

/// Load settings from a TOML string (useful for testing).
pub fn load_settings_from_str(toml_str: &str) -> Result<Settings, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
