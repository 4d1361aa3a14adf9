//! Model API clients
//!
//! [`CompletionModel`] is the seam the invocation wrapper depends on;
//! [`AnthropicClient`] and [`OpenAiClient`] implement it over HTTP.

pub mod anthropic;
pub mod error_utils;
pub mod openai;
pub mod parsers;
pub mod provider_trait;
pub mod types;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
pub use parsers::ResponseParser;
pub use provider_trait::{CompletionModel, ModelClient};
#[cfg(test)]
pub use provider_trait::MockCompletionModel;
pub use types::{Completion, Provider, TokenUsage};
