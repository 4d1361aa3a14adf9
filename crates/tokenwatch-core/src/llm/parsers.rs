//! Response parsing for each provider

use crate::error::{TokenwatchError, TokenwatchResult};
use serde_json::Value;

use super::types::{Completion, TokenUsage};

/// Response parser for the supported APIs
pub struct ResponseParser;

impl ResponseParser {
    /// Parse an Anthropic Messages API response.
    ///
    /// `content` is an array of blocks; text blocks are joined with newlines,
    /// other block types are ignored. `usage.input_tokens` and
    /// `usage.output_tokens` are required.
    pub fn parse_anthropic(response: &Value) -> TokenwatchResult<Completion> {
        let blocks = response["content"].as_array().ok_or_else(|| {
            TokenwatchError::llm_with_provider("Anthropic response has no content array", "anthropic")
        })?;

        let text = blocks
            .iter()
            .filter(|block| block["type"].as_str() == Some("text"))
            .filter_map(|block| block["text"].as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let usage = Self::usage(response, "input_tokens", "output_tokens", "anthropic")?;

        let mut completion = Completion::new(text, usage);
        if let Some(model) = response["model"].as_str() {
            completion = completion.with_model(model);
        }
        Ok(completion)
    }

    /// Parse an OpenAI Chat Completions response.
    ///
    /// Text comes from `choices[0].message.content`; a null content (e.g. a
    /// tool-call-only reply) yields empty text.
    pub fn parse_openai(response: &Value) -> TokenwatchResult<Completion> {
        let message = response["choices"]
            .get(0)
            .map(|choice| &choice["message"])
            .filter(|message| message.is_object())
            .ok_or_else(|| {
                TokenwatchError::llm_with_provider("OpenAI response has no choices", "openai")
            })?;

        let text = message["content"].as_str().unwrap_or_default();
        let usage = Self::usage(response, "prompt_tokens", "completion_tokens", "openai")?;

        let mut completion = Completion::new(text, usage);
        if let Some(model) = response["model"].as_str() {
            completion = completion.with_model(model);
        }
        Ok(completion)
    }

    fn usage(
        response: &Value,
        input_field: &str,
        output_field: &str,
        provider: &str,
    ) -> TokenwatchResult<TokenUsage> {
        let usage = response["usage"].as_object().ok_or_else(|| {
            TokenwatchError::llm_with_provider(
                format!("{} response has no usage object", provider),
                provider,
            )
        })?;

        let count = |field: &str| {
            usage.get(field).and_then(Value::as_u64).ok_or_else(|| {
                TokenwatchError::llm_with_provider(
                    format!("{} usage is missing '{}'", provider, field),
                    provider,
                )
            })
        };

        Ok(TokenUsage::new(count(input_field)?, count(output_field)?))
    }
}
