//! The usage record sent to the ingestion endpoint

use crate::error::{TokenwatchError, TokenwatchResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to a usage record.
pub type Metadata = Map<String, Value>;

/// Metrics for one completed model invocation.
///
/// Serializes to exactly the JSON body the ingestion endpoint expects:
///
/// ```json
/// {"project_id": "my-app", "model": "claude-3-sonnet", "provider": "anthropic",
///  "input_tokens": 12, "output_tokens": 3, "latency_ms": 840, "metadata": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub project_id: String,
    pub model: String,
    pub provider: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl UsageRecord {
    /// Create a record with empty metadata
    pub fn new(
        project_id: impl Into<String>,
        model: impl Into<String>,
        provider: impl Into<String>,
        input_tokens: u64,
        output_tokens: u64,
        latency_ms: u64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            model: model.into(),
            provider: provider.into(),
            input_tokens,
            output_tokens,
            latency_ms,
            metadata: Metadata::new(),
        }
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Input plus output tokens
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Check the fields the ingestion endpoint rejects when blank
    pub fn validate(&self) -> TokenwatchResult<()> {
        for (field, value) in [
            ("project_id", &self.project_id),
            ("model", &self.model),
            ("provider", &self.provider),
        ] {
            if value.trim().is_empty() {
                return Err(TokenwatchError::invalid_input_field(
                    format!("usage record field '{}' must not be empty", field),
                    field,
                ));
            }
        }
        Ok(())
    }

    /// Serialize to the wire body
    pub fn to_json(&self) -> TokenwatchResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
