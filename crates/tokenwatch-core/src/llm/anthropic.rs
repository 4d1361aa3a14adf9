//! Anthropic Messages API client

use crate::config::{ModelConfig, defaults};
use crate::error::TokenwatchResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::instrument;

use super::error_utils::{handle_http_error, handle_parse_error, handle_send_error};
use super::parsers::ResponseParser;
use super::provider_trait::CompletionModel;
use super::types::{Completion, Provider};

/// API version sent when none is configured
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    api_version: String,
    timeout: Duration,
    http_client: Client,
}

impl AnthropicClient {
    /// Create a client with default endpoint, model and limits
    pub fn new(api_key: impl Into<String>) -> TokenwatchResult<Self> {
        let config = ModelConfig {
            provider: Provider::Anthropic,
            api_key: Some(api_key.into()),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &ModelConfig) -> TokenwatchResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(defaults::model_connect_timeout())
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model_name().to_string(),
            max_tokens: config.max_tokens.unwrap_or(defaults::MAX_TOKENS),
            api_version: config
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: config.request_timeout,
            http_client,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        })
    }
}

#[async_trait]
impl CompletionModel for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model), level = "debug")]
    async fn complete(&self, prompt: &str) -> TokenwatchResult<Completion> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| handle_send_error(e, "Anthropic", self.timeout))?;

        if !response.status().is_success() {
            return Err(handle_http_error(response, "Anthropic").await);
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| handle_parse_error(e, "Anthropic", self.timeout))?;

        ResponseParser::parse_anthropic(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = AnthropicClient::new("sk-ant-test").unwrap();
        let body = client.request_body("What is the capital of France?");

        assert_eq!(body["model"], "claude-3-sonnet-20240229");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "What is the capital of France?");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ModelConfig {
            api_key: Some("sk-ant-test".to_string()),
            base_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        let client = AnthropicClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.api_version, DEFAULT_API_VERSION);
    }
}
