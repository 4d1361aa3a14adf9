//! Configuration management
//!
//! Settings are resolved once at startup, in this order:
//! 1. a config file (explicit path, else `~/.config/tokenwatch/config.toml`
//!    when it exists)
//! 2. a `.env` file in the working directory
//! 3. environment variable overrides (see [`env_loader`])
//!
//! The result is validated before anything uses it; missing telemetry
//! credentials are a startup error, not a runtime surprise.

pub mod defaults;
pub mod env_loader;
pub mod file_loader;
pub mod model;

pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::{load_from_file, save_to_file};
pub use model::{Config, DispatchMode, LogFormat, LoggingConfig, ModelConfig, TelemetryConfig};

use crate::error::{TokenwatchError, TokenwatchResult};
use once_cell::sync::OnceCell;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::debug;

static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tokenwatch").join("config.toml"))
}

/// Resolve and validate configuration
pub fn load_config(path: Option<&Path>) -> TokenwatchResult<Config> {
    let config = resolve_config(path)?;
    config.validate()?;
    Ok(config)
}

/// Merge file, `.env` and environment settings without validating them
pub fn resolve_config(path: Option<&Path>) -> TokenwatchResult<Config> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                debug!(path = %path.display(), "Loading default config file");
                load_from_file(&path)?
            }
            None => Config::default(),
        },
    };

    if let Ok(path) = dotenv::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Install the process-wide configuration. Fails if already installed.
pub fn init(config: Config) -> TokenwatchResult<&'static Config> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| TokenwatchError::config("Configuration already initialized"))?;
    global()
}

/// The process-wide configuration installed by [`init`]
pub fn global() -> TokenwatchResult<&'static Config> {
    GLOBAL_CONFIG
        .get()
        .ok_or_else(|| TokenwatchError::config("Configuration not initialized"))
}

/// Parse an ingestion endpoint; only absolute http(s) URLs are accepted
pub fn parse_endpoint_url(raw: &str) -> TokenwatchResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        TokenwatchError::config_field(
            format!("Invalid endpoint URL '{}': {}", raw, e),
            "telemetry.endpoint_url",
        )
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TokenwatchError::config_field(
            format!("Unsupported endpoint URL scheme '{}'", scheme),
            "telemetry.endpoint_url",
        )),
    }
}
