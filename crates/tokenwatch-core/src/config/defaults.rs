//! Default values shared by the configuration types

use std::time::Duration;

/// Deployment environment tag when `ENV` is unset
pub const ENVIRONMENT: &str = "development";

/// Generation limit for providers that require one
pub const MAX_TOKENS: u32 = 1024;

/// Record label for the default Anthropic model, as the ingest pricing table
/// keys it
pub const ANTHROPIC_REPORT_MODEL: &str = "claude-3-sonnet";

/// Request timeout for model API calls (60 seconds).
///
/// Telemetry requests deliberately use the HTTP client default instead.
pub const MODEL_REQUEST_SECS: u64 = 60;

/// Connection timeout for model API calls (30 seconds)
pub const MODEL_CONNECT_SECS: u64 = 30;

pub fn model_request_timeout() -> Duration {
    Duration::from_secs(MODEL_REQUEST_SECS)
}

pub fn model_connect_timeout() -> Duration {
    Duration::from_secs(MODEL_CONNECT_SECS)
}
