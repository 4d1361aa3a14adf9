//! Tokenwatch Core Library
//!
//! Calls a text-generation API, measures how long the call took, and reports
//! the token usage to an ingestion endpoint.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokenwatch_core::{AnthropicClient, HttpReporter, TrackedModel};
//! use std::sync::Arc;
//!
//! # async fn run() -> tokenwatch_core::TokenwatchResult<()> {
//! let model = AnthropicClient::new(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())?;
//! let reporter = HttpReporter::new("https://obs.example.com/ingest", "ingest-token")?;
//! let tracked = TrackedModel::new(model, Arc::new(reporter), "my-app")
//!     .with_report_model("claude-3-sonnet");
//!
//! let answer = tracked.chat("What is the capital of France?", Some("user-123")).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod invocation;
pub mod llm;
pub mod sanitize;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Config, DispatchMode};
pub use error::{TokenwatchError, TokenwatchResult, UnifiedError};
pub use invocation::TrackedModel;
pub use llm::{
    AnthropicClient, Completion, CompletionModel, ModelClient, OpenAiClient, Provider, TokenUsage,
};
pub use telemetry::{
    BackgroundReporter, HttpReporter, Metadata, NoopReporter, ReporterSnapshot, SubmitOutcome,
    UsageRecord, UsageReporter, build_reporter,
};
