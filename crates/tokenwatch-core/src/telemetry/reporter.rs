//! Submitting usage records to the ingestion endpoint

use crate::error::TokenwatchResult;
use crate::sanitize::sanitize_body;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::{DispatchMode, TelemetryConfig};

use super::background::BackgroundReporter;
use super::metrics::{ReporterMetrics, SharedReporterMetrics};
use super::record::UsageRecord;

/// Anything that accepts usage records.
///
/// `submit` never fails: whatever goes wrong is logged and counted, and the
/// caller carries on.
#[async_trait]
pub trait UsageReporter: Send + Sync {
    /// Hand over one record
    async fn submit(&self, record: UsageRecord);

    /// Outcome counters, if the reporter keeps any
    fn metrics(&self) -> Option<SharedReporterMetrics> {
        None
    }

    /// Deliver anything still pending and stop accepting records
    async fn shutdown(&self) {}
}

#[async_trait]
impl<R: UsageReporter + ?Sized> UsageReporter for Arc<R> {
    async fn submit(&self, record: UsageRecord) {
        (**self).submit(record).await
    }

    fn metrics(&self) -> Option<SharedReporterMetrics> {
        (**self).metrics()
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

/// Build the reporter described by the configuration.
///
/// Background dispatch spawns its worker, so this must run inside a Tokio
/// runtime.
pub fn build_reporter(config: &TelemetryConfig) -> TokenwatchResult<Arc<dyn UsageReporter>> {
    if !config.enabled {
        debug!("Telemetry disabled");
        return Ok(Arc::new(NoopReporter));
    }
    config.validate()?;

    let endpoint = config.endpoint_url.as_deref().unwrap_or_default();
    let api_key = config.api_key.clone().unwrap_or_default();
    let reporter = HttpReporter::new(endpoint, api_key)?;

    Ok(match config.dispatch {
        DispatchMode::Inline => Arc::new(reporter),
        DispatchMode::Background => {
            Arc::new(BackgroundReporter::spawn(reporter, config.queue_capacity))
        }
    })
}

/// Result of one attempt to deliver a record
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 2xx with a JSON body
    Accepted { status: u16, body: Value },
    /// Non-2xx; body is sanitized for logging
    Rejected { status: u16, body: String },
    /// The request never got a response
    Transport(String),
    /// 2xx, but the body was not JSON
    InvalidBody { status: u16, error: String },
    /// Failed local validation and was never sent
    InvalidRecord(String),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Stable label used as the `outcome` log field
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Transport(_) => "transport_error",
            Self::InvalidBody { .. } => "invalid_response",
            Self::InvalidRecord(_) => "invalid_record",
        }
    }

    /// Emit the operator-visible log line for this outcome
    pub fn log(&self, record: &UsageRecord) {
        let outcome = self.label();
        match self {
            Self::Accepted { status, body } => info!(
                outcome,
                status,
                project_id = %record.project_id,
                model = %record.model,
                response = %body,
                "Usage record sent"
            ),
            Self::Rejected { status, body } => warn!(
                outcome,
                status,
                project_id = %record.project_id,
                model = %record.model,
                response = %body,
                "Ingestion endpoint rejected usage record"
            ),
            Self::Transport(error) => warn!(
                outcome,
                project_id = %record.project_id,
                model = %record.model,
                error = %error,
                "Failed to send usage record"
            ),
            Self::InvalidBody { status, error } => warn!(
                outcome,
                status,
                project_id = %record.project_id,
                error = %error,
                "Ingestion endpoint returned a non-JSON body"
            ),
            Self::InvalidRecord(error) => warn!(
                outcome,
                project_id = %record.project_id,
                error = %error,
                "Dropping invalid usage record"
            ),
        }
    }
}

/// Posts each record to the endpoint and waits for the answer.
///
/// This puts the ingestion round trip on the caller's path; see
/// [`super::BackgroundReporter`] for the variant that does not.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    endpoint_url: Url,
    api_key: String,
    http_client: Client,
    metrics: SharedReporterMetrics,
}

impl HttpReporter {
    /// Create a reporter with a default HTTP client.
    ///
    /// The client has no request timeout of its own.
    pub fn new(endpoint_url: &str, api_key: impl Into<String>) -> TokenwatchResult<Self> {
        Self::with_client(endpoint_url, api_key, Client::new())
    }

    /// Create a reporter sharing an existing HTTP client
    pub fn with_client(
        endpoint_url: &str,
        api_key: impl Into<String>,
        http_client: Client,
    ) -> TokenwatchResult<Self> {
        let endpoint_url = crate::config::parse_endpoint_url(endpoint_url)?;
        Ok(Self {
            endpoint_url,
            api_key: api_key.into(),
            http_client,
            metrics: Arc::new(ReporterMetrics::new()),
        })
    }

    /// Record outcomes into the given counters instead of private ones
    pub fn with_metrics(mut self, metrics: SharedReporterMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint_url
    }

    /// Deliver one record and report what happened.
    ///
    /// Does not log or touch the counters; [`UsageReporter::submit`] does both.
    #[instrument(skip(self, record), fields(endpoint = %self.endpoint_url), level = "debug")]
    pub async fn send(&self, record: &UsageRecord) -> SubmitOutcome {
        if let Err(e) = record.validate() {
            return SubmitOutcome::InvalidRecord(e.to_string());
        }

        let response = match self
            .http_client
            .post(self.endpoint_url.clone())
            .bearer_auth(&self.api_key)
            .json(record)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return SubmitOutcome::Transport(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return SubmitOutcome::Rejected {
                status: status.as_u16(),
                body: sanitize_body(&body),
            };
        }

        match response.json::<Value>().await {
            Ok(body) => SubmitOutcome::Accepted {
                status: status.as_u16(),
                body,
            },
            Err(e) => SubmitOutcome::InvalidBody {
                status: status.as_u16(),
                error: e.to_string(),
            },
        }
    }

    /// Send, log and count; used by both dispatch modes
    pub(crate) async fn deliver(&self, record: UsageRecord) -> SubmitOutcome {
        let outcome = self.send(&record).await;
        outcome.log(&record);
        self.metrics.record_outcome(&outcome);
        outcome
    }
}

#[async_trait]
impl UsageReporter for HttpReporter {
    async fn submit(&self, record: UsageRecord) {
        self.metrics.submitted.inc();
        self.deliver(record).await;
    }

    fn metrics(&self) -> Option<SharedReporterMetrics> {
        Some(self.metrics.clone())
    }
}

/// Reporter used when telemetry is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

#[async_trait]
impl UsageReporter for NoopReporter {
    async fn submit(&self, record: UsageRecord) {
        debug!(
            project_id = %record.project_id,
            model = %record.model,
            "Telemetry disabled; usage record discarded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(SubmitOutcome::Transport("x".into()).label(), "transport_error");
        assert_eq!(
            SubmitOutcome::Rejected {
                status: 500,
                body: String::new()
            }
            .label(),
            "rejected"
        );
        assert!(
            SubmitOutcome::Accepted {
                status: 201,
                body: Value::Null
            }
            .is_success()
        );
        assert!(!SubmitOutcome::InvalidRecord("x".into()).is_success());
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(HttpReporter::new("not a url", "key").is_err());
        assert!(HttpReporter::new("ftp://example.com/ingest", "key").is_err());
        assert!(HttpReporter::new("https://obs.example.com/ingest", "key").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_record_is_not_sent() {
        // Port 9 (discard) is never contacted because validation fails first.
        let reporter = HttpReporter::new("http://127.0.0.1:9/ingest", "key").unwrap();
        let record = UsageRecord::new("", "claude-3-sonnet", "anthropic", 1, 1, 1);

        let outcome = reporter.send(&record).await;
        assert!(matches!(outcome, SubmitOutcome::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn test_submit_counts_invalid_record() {
        let reporter = HttpReporter::new("http://127.0.0.1:9/ingest", "key").unwrap();
        reporter
            .submit(UsageRecord::new("p", "", "anthropic", 1, 1, 1))
            .await;

        let snapshot = reporter.metrics().unwrap().snapshot();
        assert_eq!(snapshot.submitted, 1);
        assert_eq!(snapshot.invalid_records, 1);
    }

    #[tokio::test]
    async fn test_noop_reporter_accepts_anything() {
        let reporter = NoopReporter;
        reporter.submit(UsageRecord::new("", "", "", 0, 0, 0)).await;
        assert!(reporter.metrics().is_none());
    }

    #[tokio::test]
    async fn test_build_reporter_modes() {
        let mut config = TelemetryConfig {
            endpoint_url: Some("http://127.0.0.1:9/ingest".to_string()),
            api_key: Some("key".to_string()),
            project_id: Some("my-app".to_string()),
            dispatch: DispatchMode::Inline,
            ..Default::default()
        };
        assert!(build_reporter(&config).unwrap().metrics().is_some());

        config.dispatch = DispatchMode::Background;
        let reporter = build_reporter(&config).unwrap();
        assert!(reporter.metrics().is_some());
        reporter.shutdown().await;

        config.enabled = false;
        assert!(build_reporter(&config).unwrap().metrics().is_none());

        config.enabled = true;
        config.api_key = None;
        assert!(build_reporter(&config).is_err());
    }

    #[tokio::test]
    async fn test_arc_reporter_forwards_metrics() {
        let reporter: Arc<dyn UsageReporter> =
            Arc::new(HttpReporter::new("http://127.0.0.1:9/ingest", "key").unwrap());
        reporter
            .submit(UsageRecord::new("p", "m", "", 0, 0, 0))
            .await;
        assert_eq!(reporter.metrics().unwrap().invalid_records.get(), 1);
    }
}
