//! File-based configuration loading

use crate::config::model::Config;
use crate::error::{TokenwatchError, TokenwatchResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports TOML, YAML and JSON based on file extension; anything else is
/// read as TOML.
pub fn load_from_file(path: &Path) -> TokenwatchResult<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        TokenwatchError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            TokenwatchError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|e| {
            TokenwatchError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
        _ => toml::from_str(&content).map_err(|e| {
            TokenwatchError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Write a configuration as TOML
pub fn save_to_file(config: &Config, path: &Path) -> TokenwatchResult<()> {
    let content = toml::to_string_pretty(config).map_err(|e| {
        TokenwatchError::config(format!("Failed to serialize config: {}", e))
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                TokenwatchError::io_with_path(e.to_string(), parent.display().to_string())
            })?;
        }
    }

    fs::write(path, content)
        .map_err(|e| TokenwatchError::io_with_path(e.to_string(), path.display().to_string()))
}
