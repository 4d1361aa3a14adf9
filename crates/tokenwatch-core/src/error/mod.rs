//! Error types for Tokenwatch
//!
//! Every fallible operation in the crate returns [`TokenwatchResult`]. Errors
//! implement [`UnifiedError`], which exposes a stable error code, the message,
//! optional context and whether retrying could help.
//!
//! Telemetry submission failures never surface as errors to callers; they are
//! reported through [`crate::telemetry::SubmitOutcome`] instead.

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{ResultExt, TokenwatchError, TokenwatchResult, UnifiedError};
