//! Timing model calls and reporting their usage

use crate::config::Config;
use crate::error::TokenwatchResult;
use crate::llm::{Completion, CompletionModel};
use crate::telemetry::{Metadata, UsageRecord, UsageReporter};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

/// Feature tag attached by [`TrackedModel::chat`]
pub const CHAT_FEATURE: &str = "chat";

/// Wraps a model so every successful call produces exactly one usage record.
///
/// Failed model calls produce no record and their error is returned as is.
/// Telemetry failures never affect the returned text.
pub struct TrackedModel<M> {
    model: M,
    reporter: Arc<dyn UsageReporter>,
    project_id: String,
    report_model: Option<String>,
    environment: String,
}

impl<M: CompletionModel> TrackedModel<M> {
    pub fn new(model: M, reporter: Arc<dyn UsageReporter>, project_id: impl Into<String>) -> Self {
        Self {
            model,
            reporter,
            project_id: project_id.into(),
            report_model: None,
            environment: crate::config::defaults::ENVIRONMENT.to_string(),
        }
    }

    /// Build from loaded configuration: project id, report label and
    /// environment tag all come from `config`.
    pub fn from_config(
        model: M,
        reporter: Arc<dyn UsageReporter>,
        config: &Config,
    ) -> TokenwatchResult<Self> {
        let project_id = if config.telemetry.enabled {
            config.telemetry.project_id()?.to_string()
        } else {
            config.telemetry.project_id.clone().unwrap_or_default()
        };

        let mut tracked = Self::new(model, reporter, project_id)
            .with_environment(config.environment());
        if let Some(label) = config.model.report_label() {
            tracked = tracked.with_report_model(label);
        }
        Ok(tracked)
    }

    /// Model name written to records instead of the one the API reports
    pub fn with_report_model(mut self, label: impl Into<String>) -> Self {
        self.report_model = Some(label.into());
        self
    }

    /// Deployment environment tag used by [`Self::chat`]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn reporter(&self) -> &Arc<dyn UsageReporter> {
        &self.reporter
    }

    /// Run the prompt, report usage with `metadata`, return the generated text
    #[instrument(
        skip(self, prompt, metadata),
        fields(provider = %self.model.provider(), model = %self.model.model())
    )]
    pub async fn invoke(&self, prompt: &str, metadata: Metadata) -> TokenwatchResult<String> {
        let started = Instant::now();

        let completion = match self.model.complete(prompt).await {
            Ok(completion) => completion,
            Err(e) => {
                error!(error = %e, "Model invocation failed");
                return Err(e);
            }
        };

        let latency_ms = elapsed_ms(started.elapsed());
        debug!(
            latency_ms,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "Model invocation completed"
        );

        let record = self.usage_record(&completion, latency_ms, metadata);
        self.reporter.submit(record).await;

        Ok(completion.text)
    }

    /// [`Self::invoke`] with the metadata the chat integration sends:
    /// `user_id` (null when absent), `feature` and `environment`.
    pub async fn chat(&self, prompt: &str, user_id: Option<&str>) -> TokenwatchResult<String> {
        let mut metadata = Metadata::new();
        metadata.insert(
            "user_id".to_string(),
            user_id.map_or(Value::Null, Value::from),
        );
        metadata.insert("feature".to_string(), Value::from(CHAT_FEATURE));
        metadata.insert(
            "environment".to_string(),
            Value::from(self.environment.as_str()),
        );
        self.invoke(prompt, metadata).await
    }

    fn usage_record(&self, completion: &Completion, latency_ms: u64, metadata: Metadata) -> UsageRecord {
        let model = self
            .report_model
            .as_deref()
            .or(completion.model.as_deref())
            .unwrap_or_else(|| self.model.model());

        UsageRecord::new(
            self.project_id.as_str(),
            model,
            self.model.provider().as_str(),
            completion.usage.input_tokens,
            completion.usage.output_tokens,
            latency_ms,
        )
        .with_metadata(metadata)
    }
}

/// Whole milliseconds, rounded to nearest
pub fn elapsed_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenwatchError;
    use crate::llm::{MockCompletionModel, Provider, TokenUsage};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        records: Mutex<Vec<UsageRecord>>,
    }

    #[async_trait]
    impl UsageReporter for RecordingReporter {
        async fn submit(&self, record: UsageRecord) {
            self.records.lock().push(record);
        }
    }

    fn claude(result: TokenwatchResult<Completion>) -> MockCompletionModel {
        let mut model = MockCompletionModel::new();
        model.expect_provider().return_const(Provider::Anthropic);
        model
            .expect_model()
            .return_const("claude-3-sonnet-20240229".to_string());
        model.expect_complete().return_once(move |_| result);
        model
    }

    #[test]
    fn test_elapsed_ms_rounds() {
        assert_eq!(elapsed_ms(Duration::from_micros(1_499)), 1);
        assert_eq!(elapsed_ms(Duration::from_micros(1_500)), 2);
        assert_eq!(elapsed_ms(Duration::ZERO), 0);
    }

    #[tokio::test]
    async fn test_chat_reports_usage_and_returns_text() {
        let reporter = Arc::new(RecordingReporter::default());
        let completion = Completion::new("Paris.", TokenUsage::new(12, 3))
            .with_model("claude-3-sonnet-20240229");
        let tracked = TrackedModel::new(claude(Ok(completion)), reporter.clone(), "my-app")
            .with_report_model("claude-3-sonnet")
            .with_environment("test");

        let text = tracked
            .chat("What is the capital of France?", Some("user-123"))
            .await
            .unwrap();
        assert_eq!(text, "Paris.");

        let records = reporter.records.lock();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.project_id, "my-app");
        assert_eq!(record.model, "claude-3-sonnet");
        assert_eq!(record.provider, "anthropic");
        assert_eq!(record.input_tokens, 12);
        assert_eq!(record.output_tokens, 3);
        assert_eq!(record.metadata["user_id"], "user-123");
        assert_eq!(record.metadata["feature"], "chat");
        assert_eq!(record.metadata["environment"], "test");
    }

    #[tokio::test]
    async fn test_chat_without_user_sends_null() {
        let reporter = Arc::new(RecordingReporter::default());
        let completion = Completion::new("ok", TokenUsage::new(1, 1));
        let tracked = TrackedModel::new(claude(Ok(completion)), reporter.clone(), "my-app");

        tracked.chat("hi", None).await.unwrap();

        let records = reporter.records.lock();
        assert!(records[0].metadata["user_id"].is_null());
        assert_eq!(records[0].metadata["environment"], "development");
    }

    #[tokio::test]
    async fn test_invoke_defaults_to_empty_metadata_and_api_model() {
        let reporter = Arc::new(RecordingReporter::default());
        let completion =
            Completion::new("ok", TokenUsage::new(4, 5)).with_model("claude-3-sonnet-20240229");
        let tracked = TrackedModel::new(claude(Ok(completion)), reporter.clone(), "my-app");

        tracked.invoke("hi", Metadata::new()).await.unwrap();

        let records = reporter.records.lock();
        assert!(records[0].metadata.is_empty());
        assert_eq!(records[0].model, "claude-3-sonnet-20240229");
    }

    #[tokio::test]
    async fn test_requested_model_used_when_api_echoes_none() {
        let reporter = Arc::new(RecordingReporter::default());
        let completion = Completion::new("ok", TokenUsage::new(4, 5));
        let mut model = MockCompletionModel::new();
        model.expect_provider().return_const(Provider::OpenAi);
        model.expect_model().return_const("gpt-4-turbo".to_string());
        model
            .expect_complete()
            .return_once(move |_| Ok(completion));
        let tracked = TrackedModel::new(model, reporter.clone(), "my-app");

        tracked.invoke("hi", Metadata::new()).await.unwrap();

        let records = reporter.records.lock();
        assert_eq!(records[0].model, "gpt-4-turbo");
        assert_eq!(records[0].provider, "openai");
    }

    #[tokio::test]
    async fn test_model_failure_skips_telemetry() {
        let reporter = Arc::new(RecordingReporter::default());
        let tracked = TrackedModel::new(
            claude(Err(TokenwatchError::timeout(60))),
            reporter.clone(),
            "my-app",
        );

        let err = tracked.chat("hi", None).await.unwrap_err();
        assert!(matches!(err, TokenwatchError::Timeout { seconds: 60, .. }));
        assert!(reporter.records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_from_config_reports_default_model_under_short_name() {
        let reporter = Arc::new(RecordingReporter::default());
        let mut config = Config::default();
        config.telemetry.project_id = Some("my-app".to_string());
        let completion = Completion::new("Paris.", TokenUsage::new(12, 3))
            .with_model("claude-3-sonnet-20240229");

        let tracked =
            TrackedModel::from_config(claude(Ok(completion)), reporter.clone(), &config).unwrap();
        tracked.chat("What is the capital of France?", None).await.unwrap();

        let records = reporter.records.lock();
        assert_eq!(records[0].model, "claude-3-sonnet");
        assert_eq!(records[0].project_id, "my-app");
    }

    #[test]
    fn test_from_config_requires_project_when_enabled() {
        let config = Config::default();
        let result = TrackedModel::from_config(
            claude(Ok(Completion::new("", TokenUsage::default()))),
            Arc::new(RecordingReporter::default()),
            &config,
        );
        assert!(result.is_err());
    }
}
