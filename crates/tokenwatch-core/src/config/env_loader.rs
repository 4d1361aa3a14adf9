//! Environment variable overrides

use crate::config::model::Config;
use crate::error::{TokenwatchError, TokenwatchResult};
use std::env;

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> TokenwatchResult<()> {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides read through `lookup`.
///
/// Recognized variables:
/// - `TOKENWATCH_ENDPOINT_URL`, `TOKENWATCH_API_KEY`, `TOKENWATCH_PROJECT_ID`
/// - `TOKENWATCH_ENABLED`, `TOKENWATCH_DISPATCH`, `TOKENWATCH_QUEUE_CAPACITY`
/// - `TOKENWATCH_PROVIDER`, `TOKENWATCH_MODEL`, `TOKENWATCH_REPORT_MODEL`,
///   `TOKENWATCH_MAX_TOKENS`
/// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` for the selected provider
/// - `TOKENWATCH_LOG_LEVEL`, `TOKENWATCH_LOG_FORMAT`
/// - `ENV`, the deployment environment tag
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> TokenwatchResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // Telemetry
    if let Some(url) = get("TOKENWATCH_ENDPOINT_URL") {
        config.telemetry.endpoint_url = Some(url);
    }
    if let Some(key) = get("TOKENWATCH_API_KEY") {
        config.telemetry.api_key = Some(key);
    }
    if let Some(project) = get("TOKENWATCH_PROJECT_ID") {
        config.telemetry.project_id = Some(project);
    }
    if let Some(enabled) = get("TOKENWATCH_ENABLED") {
        config.telemetry.enabled = parse_bool(&enabled).ok_or_else(|| {
            TokenwatchError::config_field(
                format!("Invalid TOKENWATCH_ENABLED value '{}'", enabled),
                "telemetry.enabled",
            )
        })?;
    }
    if let Some(dispatch) = get("TOKENWATCH_DISPATCH") {
        config.telemetry.dispatch = dispatch.parse()?;
    }
    if let Some(capacity) = get("TOKENWATCH_QUEUE_CAPACITY") {
        config.telemetry.queue_capacity = capacity.parse().map_err(|_| {
            TokenwatchError::config_field(
                format!("Invalid TOKENWATCH_QUEUE_CAPACITY value '{}'", capacity),
                "telemetry.queue_capacity",
            )
        })?;
    }

    // Model; provider first so the matching key variable is read
    if let Some(provider) = get("TOKENWATCH_PROVIDER") {
        config.model.provider = provider.parse()?;
    }
    if let Some(key) = get(config.model.provider.api_key_env()) {
        config.model.api_key = Some(key);
    }
    if let Some(model) = get("TOKENWATCH_MODEL") {
        config.model.model = Some(model);
    }
    if let Some(label) = get("TOKENWATCH_REPORT_MODEL") {
        config.model.report_model = Some(label);
    }
    if let Some(max_tokens) = get("TOKENWATCH_MAX_TOKENS") {
        config.model.max_tokens = Some(max_tokens.parse().map_err(|_| {
            TokenwatchError::config_with_context(
                "Invalid TOKENWATCH_MAX_TOKENS value",
                format!("Parsing max_tokens value '{}'", max_tokens),
            )
        })?);
    }

    // Logging
    if let Some(level) = get("TOKENWATCH_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get("TOKENWATCH_LOG_FORMAT") {
        config.logging.format = format.parse()?;
    }

    if let Some(environment) = get("ENV") {
        config.environment = Some(environment);
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchMode;
    use crate::llm::Provider;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> TokenwatchResult<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        apply_overrides_from(&mut config, |key| vars.get(key).cloned())?;
        Ok(config)
    }

    #[test]
    fn test_telemetry_overrides() {
        let config = apply(&[
            ("TOKENWATCH_ENDPOINT_URL", "https://obs.example.com/ingest"),
            ("TOKENWATCH_API_KEY", "token"),
            ("TOKENWATCH_PROJECT_ID", "my-app"),
            ("TOKENWATCH_DISPATCH", "inline"),
            ("TOKENWATCH_QUEUE_CAPACITY", "16"),
        ])
        .unwrap();

        assert_eq!(
            config.telemetry.endpoint_url.as_deref(),
            Some("https://obs.example.com/ingest")
        );
        assert_eq!(config.telemetry.api_key.as_deref(), Some("token"));
        assert_eq!(config.telemetry.project_id.as_deref(), Some("my-app"));
        assert_eq!(config.telemetry.dispatch, DispatchMode::Inline);
        assert_eq!(config.telemetry.queue_capacity, 16);
    }

    #[test]
    fn test_provider_key_follows_selected_provider() {
        let config = apply(&[
            ("TOKENWATCH_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-openai"),
        ])
        .unwrap();
        assert_eq!(config.model.provider, Provider::OpenAi);
        assert_eq!(config.model.api_key.as_deref(), Some("sk-openai"));

        let config = apply(&[("ANTHROPIC_API_KEY", "sk-ant")]).unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("sk-ant"));
    }

    #[test]
    fn test_environment_tag() {
        let config = apply(&[("ENV", "production")]).unwrap();
        assert_eq!(config.environment(), "production");

        let config = apply(&[("ENV", "")]).unwrap();
        assert_eq!(config.environment(), "development");
    }

    #[test]
    fn test_enabled_flag() {
        let config = apply(&[("TOKENWATCH_ENABLED", "off")]).unwrap();
        assert!(!config.telemetry.enabled);
        assert!(apply(&[("TOKENWATCH_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn test_oversized_queue_capacity_fails_validation() {
        let max = usize::MAX.to_string();
        let mut config = apply(&[
            ("TOKENWATCH_ENDPOINT_URL", "https://obs.example.com/ingest"),
            ("TOKENWATCH_API_KEY", "a590aec22adeab9bb9fcf8ff81ccf790"),
            ("TOKENWATCH_PROJECT_ID", "my-app"),
            ("TOKENWATCH_QUEUE_CAPACITY", max.as_str()),
        ])
        .unwrap();
        assert_eq!(config.telemetry.queue_capacity, usize::MAX);
        assert!(config.validate().is_err());

        config.telemetry.queue_capacity = 4096;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_tokens_override() {
        let config = apply(&[("TOKENWATCH_MAX_TOKENS", "2048")]).unwrap();
        assert_eq!(config.model.max_tokens, Some(2048));
        assert_eq!(Config::default().model.max_tokens, None);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(apply(&[("TOKENWATCH_QUEUE_CAPACITY", "lots")]).is_err());
        assert!(apply(&[("TOKENWATCH_MAX_TOKENS", "-1")]).is_err());
        assert!(apply(&[("TOKENWATCH_PROVIDER", "palm")]).is_err());
    }
}
