//! Bridge configuration.
//!
//! Read once at startup from `~/.config/kwin-bridge/config.toml` (or an
//! explicit path). A missing file means defaults; a broken one is reported
//! and also falls back to defaults, so configuration never stops the bridge.

mod types;
mod validation;

pub use types::{BridgeConfig, DEFAULT_CURSOR_THROTTLE};
pub use validation::{ValidationWarning, validate_config};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kwin-bridge"))
}

/// Default location of the config file.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoDirFound)
}

/// Parse a config file. `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> Result<Option<BridgeConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFailed)?;
    toml::from_str(&content)
        .map(Some)
        .map_err(ConfigError::ParseFailed)
}

/// Load the config from `path`, or from the default location.
///
/// Never fails: problems are logged and defaults are used. Validation
/// warnings are logged too.
pub fn load_config(path: Option<&Path>) -> BridgeConfig {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                return BridgeConfig::default();
            }
        },
    };

    let config = match read_config(&path) {
        Ok(Some(config)) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            BridgeConfig::default()
        }
        Err(e) => {
            tracing::warn!("{} ({:?}), using defaults", e, path);
            BridgeConfig::default()
        }
    };

    for warning in validate_config(&config) {
        tracing::warn!("Config {}: {}", warning.field, warning.message);
    }
    config
}
