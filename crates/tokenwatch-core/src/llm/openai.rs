//! OpenAI Chat Completions API client

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

/// Client for `POST /v1/chat/completions`
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    timeout: Duration,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> TokenwatchResult<Self> {
        let config = ModelConfig {
            provider: Provider::OpenAi,
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
            max_tokens: config.max_tokens,
            timeout: config.request_timeout,
            http_client,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model), level = "debug")]
    async fn complete(&self, prompt: &str) -> TokenwatchResult<Completion> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| handle_send_error(e, "OpenAI", self.timeout))?;

        if !response.status().is_success() {
            return Err(handle_http_error(response, "OpenAI").await);
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| handle_parse_error(e, "OpenAI", self.timeout))?;

        ResponseParser::parse_openai(&response_json)
    }
}
