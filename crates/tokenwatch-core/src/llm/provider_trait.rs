//! The model seam and the unified client enum

use crate::config::ModelConfig;
use crate::error::TokenwatchResult;
use async_trait::async_trait;

use super::anthropic::AnthropicClient;
use super::openai::OpenAiClient;
use super::types::{Completion, Provider};

/// A text-generation API.
///
/// The only contract the rest of the crate relies on: given a prompt, return
/// the generated text and a token-usage breakdown, or an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Vendor reported in usage records
    fn provider(&self) -> Provider;

    /// Model requested from the API
    fn model(&self) -> &str;

    /// Run a single-turn completion
    async fn complete(&self, prompt: &str) -> TokenwatchResult<Completion>;
}

/// Concrete client selected from configuration
pub enum ModelClient {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
}

impl ModelClient {
    /// Build the client for the configured provider.
    ///
    /// Fails if the API key is missing.
    pub fn from_config(config: &ModelConfig) -> TokenwatchResult<Self> {
        Ok(match config.provider {
            Provider::Anthropic => Self::Anthropic(AnthropicClient::from_config(config)?),
            Provider::OpenAi => Self::OpenAi(OpenAiClient::from_config(config)?),
        })
    }
}

#[async_trait]
impl CompletionModel for ModelClient {
    fn provider(&self) -> Provider {
        match self {
            Self::Anthropic(c) => c.provider(),
            Self::OpenAi(c) => c.provider(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Anthropic(c) => c.model(),
            Self::OpenAi(c) => c.model(),
        }
    }

    async fn complete(&self, prompt: &str) -> TokenwatchResult<Completion> {
        match self {
            Self::Anthropic(c) => c.complete(prompt).await,
            Self::OpenAi(c) => c.complete(prompt).await,
        }
    }
}
