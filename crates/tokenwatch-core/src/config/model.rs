//! Configuration data model

use crate::error::{TokenwatchError, TokenwatchResult};
use crate::llm::Provider;
use crate::sanitize::mask_key;
use crate::telemetry::{DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::defaults;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment environment tag, sent as record metadata
    pub environment: Option<String>,
    /// Ingestion endpoint settings
    pub telemetry: TelemetryConfig,
    /// Model API settings
    pub model: ModelConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Deployment environment, `development` when unset
    pub fn environment(&self) -> &str {
        self.environment
            .as_deref()
            .unwrap_or(defaults::ENVIRONMENT)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> TokenwatchResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.telemetry.api_key = config.telemetry.api_key.as_deref().map(mask_key);
        config.model.api_key = config.model.api_key.as_deref().map(mask_key);
        config
    }

    /// Fail fast on settings that would make telemetry or the model unusable
    pub fn validate(&self) -> TokenwatchResult<()> {
        self.telemetry.validate()?;
        self.model.validate()
    }
}

/// How records reach the ingestion endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Await the POST before returning to the caller
    Inline,
    /// Queue for a worker task and return immediately
    #[default]
    Background,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Background => write!(f, "background"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = TokenwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "sync" => Ok(Self::Inline),
            "background" | "async" => Ok(Self::Background),
            other => Err(TokenwatchError::config_field(
                format!("Unknown dispatch mode '{}' (expected inline or background)", other),
                "telemetry.dispatch",
            )),
        }
    }
}

/// Ingestion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether records are sent at all
    pub enabled: bool,
    /// Absolute URL records are POSTed to
    pub endpoint_url: Option<String>,
    /// Bearer token for the endpoint
    pub api_key: Option<String>,
    /// Project id stamped on every record
    pub project_id: Option<String>,
    pub dispatch: DispatchMode,
    /// Maximum records waiting for the background worker
    pub queue_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint_url: None,
            api_key: None,
            project_id: None,
            dispatch: DispatchMode::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> TokenwatchResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let endpoint = required(&self.endpoint_url, "telemetry.endpoint_url")?;
        super::parse_endpoint_url(endpoint)?;
        required(&self.api_key, "telemetry.api_key")?;
        required(&self.project_id, "telemetry.project_id")?;

        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(TokenwatchError::config_field(
                format!(
                    "queue_capacity must be between 1 and {}, got {}",
                    MAX_QUEUE_CAPACITY, self.queue_capacity
                ),
                "telemetry.queue_capacity",
            ));
        }
        Ok(())
    }

    /// Project id, once validated
    pub fn project_id(&self) -> TokenwatchResult<&str> {
        required(&self.project_id, "telemetry.project_id")
    }
}

/// Model API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: Provider,
    /// Falls back to ANTHROPIC_API_KEY / OPENAI_API_KEY
    pub api_key: Option<String>,
    /// Model requested from the API; provider default when unset
    pub model: Option<String>,
    /// Model name written to usage records instead of the API's
    pub report_model: Option<String>,
    /// Generation limit; Anthropic requires one and falls back to 1024,
    /// OpenAI omits the field when unset
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
    /// Anthropic only
    pub api_version: Option<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            model: None,
            report_model: None,
            max_tokens: None,
            base_url: None,
            api_version: None,
            request_timeout: defaults::model_request_timeout(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> TokenwatchResult<()> {
        if self.max_tokens == Some(0) {
            return Err(TokenwatchError::config_field(
                "max_tokens must be greater than zero",
                "model.max_tokens",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(TokenwatchError::config_field(
                "request_timeout must be greater than zero",
                "model.request_timeout",
            ));
        }
        Ok(())
    }

    /// API key, required before a client is built
    pub fn require_api_key(&self) -> TokenwatchResult<&str> {
        required(&self.api_key, &format!("model.api_key ({})", self.provider.api_key_env()))
    }

    /// Model to request
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Label written to usage records.
    ///
    /// An explicit `report_model` wins. The default Anthropic model is
    /// reported under its short pricing name; otherwise `None`, and the
    /// name the API echoes is used.
    pub fn report_label(&self) -> Option<&str> {
        if let Some(label) = self.report_model.as_deref() {
            return Some(label);
        }
        match self.provider {
            Provider::Anthropic if self.model_name() == Provider::Anthropic.default_model() => {
                Some(defaults::ANTHROPIC_REPORT_MODEL)
            }
            _ => None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = TokenwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TokenwatchError::config_field(
                format!("Unknown log format '{}'", other),
                "logging.format",
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> TokenwatchResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TokenwatchError::config_field(
            format!("Missing required setting {}", field),
            field,
        )),
    }
}
