//! UnifiedError trait implementation for TokenwatchError

use super::types::{TokenwatchError, UnifiedError};

impl UnifiedError for TokenwatchError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "TW_CONFIG",
            Self::Llm { .. } => "TW_LLM",
            Self::Http { .. } => "TW_HTTP",
            Self::Json { .. } => "TW_JSON",
            Self::Io { .. } => "TW_IO",
            Self::InvalidInput { .. } => "TW_INVALID_INPUT",
            Self::Timeout { .. } => "TW_TIMEOUT",
            Self::Other { .. } => "TW_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::Llm { message, .. } => message,
            Self::Http { message, .. } => message,
            Self::Json { message, .. } => message,
            Self::Io { message, .. } => message,
            Self::InvalidInput { message, .. } => message,
            Self::Timeout { .. } => "Request timed out",
            Self::Other { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Llm { context, .. } => context.as_deref(),
            Self::Http { context, .. } => context.as_deref(),
            Self::Json { context, .. } => context.as_deref(),
            Self::Io { context, .. } => context.as_deref(),
            Self::InvalidInput { context, .. } => context.as_deref(),
            Self::Timeout { context, .. } => context.as_deref(),
            Self::Other { context, .. } => context.as_deref(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { status_code, .. } => {
                status_code.is_none_or(|code| code == 429 || code >= 500)
            }
            _ => false,
        }
    }
}
