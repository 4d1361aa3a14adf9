//! Mapping HTTP failures from model APIs onto TokenwatchError

use crate::error::TokenwatchError;
use crate::sanitize::sanitize_body;
use std::time::Duration;

/// Build an error from a failed send
pub fn handle_send_error(err: reqwest::Error, provider: &str, timeout: Duration) -> TokenwatchError {
    if err.is_timeout() {
        return TokenwatchError::timeout(timeout.as_secs())
            .with_context(format!("Waiting for {} API response", provider));
    }
    TokenwatchError::llm_with_provider(format!("{} request failed: {}", provider, err), provider)
        .with_context(format!("Failed to send HTTP request to {} API", provider))
}

/// Build an error from a non-success HTTP response
pub async fn handle_http_error(response: reqwest::Response, provider: &str) -> TokenwatchError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    TokenwatchError::llm_with_provider(
        format!(
            "{} API error (status {}): {}",
            provider,
            status,
            sanitize_body(&error_text)
        ),
        provider,
    )
}

/// Build an error from a JSON parse failure
pub fn handle_parse_error(err: reqwest::Error, provider: &str, timeout: Duration) -> TokenwatchError {
    if err.is_timeout() {
        return TokenwatchError::timeout(timeout.as_secs())
            .with_context(format!("Reading {} API response body", provider));
    }
    TokenwatchError::llm_with_provider(
        format!("Failed to parse {} response: {}", provider, err),
        provider,
    )
    .with_context(format!("Failed to deserialize {} API response as JSON", provider))
}
