//! Counters describing what happened to submitted usage records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::reporter::SubmitOutcome;

/// Counter metric (monotonically increasing)
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    value: AtomicU64,
    description: &'static str,
}

impl Counter {
    /// Create a new counter
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            value: AtomicU64::new(0),
            description,
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current count
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn description(&self) -> &str {
        self.description
    }
}

/// Outcome counters for a reporter.
///
/// `submitted` counts every record handed to a reporter. Each record then
/// lands in exactly one of the remaining counters.
#[derive(Debug)]
pub struct ReporterMetrics {
    pub submitted: Counter,
    pub accepted: Counter,
    pub rejected: Counter,
    pub transport_errors: Counter,
    pub invalid_responses: Counter,
    pub invalid_records: Counter,
    pub dropped: Counter,
    started_at: DateTime<Utc>,
}

impl ReporterMetrics {
    pub fn new() -> Self {
        Self {
            submitted: Counter::new("usage_records_submitted_total", "Records handed to the reporter"),
            accepted: Counter::new("usage_records_accepted_total", "Records acknowledged with 2xx"),
            rejected: Counter::new("usage_records_rejected_total", "Records answered with non-2xx"),
            transport_errors: Counter::new(
                "usage_records_transport_errors_total",
                "Records lost to network errors",
            ),
            invalid_responses: Counter::new(
                "usage_records_invalid_response_total",
                "2xx responses whose body was not JSON",
            ),
            invalid_records: Counter::new(
                "usage_records_invalid_total",
                "Records rejected locally before sending",
            ),
            dropped: Counter::new(
                "usage_records_dropped_total",
                "Records dropped because the dispatch queue was full or closed",
            ),
            started_at: Utc::now(),
        }
    }

    /// Count the final outcome of one record
    pub fn record_outcome(&self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Accepted { .. } => self.accepted.inc(),
            SubmitOutcome::Rejected { .. } => self.rejected.inc(),
            SubmitOutcome::Transport(_) => self.transport_errors.inc(),
            SubmitOutcome::InvalidBody { .. } => self.invalid_responses.inc(),
            SubmitOutcome::InvalidRecord(_) => self.invalid_records.inc(),
        }
    }

    /// Records that were handed over but never acknowledged
    pub fn failures(&self) -> u64 {
        self.rejected.get()
            + self.transport_errors.get()
            + self.invalid_responses.get()
            + self.invalid_records.get()
            + self.dropped.get()
    }

    pub fn snapshot(&self) -> ReporterSnapshot {
        let now = Utc::now();
        ReporterSnapshot {
            timestamp: now,
            uptime_seconds: (now - self.started_at).num_seconds().max(0) as u64,
            submitted: self.submitted.get(),
            accepted: self.accepted.get(),
            rejected: self.rejected.get(),
            transport_errors: self.transport_errors.get(),
            invalid_responses: self.invalid_responses.get(),
            invalid_records: self.invalid_records.get(),
            dropped: self.dropped.get(),
        }
    }

    /// Counters in the Prometheus text exposition format
    pub fn render(&self) -> String {
        self.counters()
            .iter()
            .map(|counter| {
                format!(
                    "# HELP {name} {}\n# TYPE {name} counter\n{name} {}\n",
                    counter.description(),
                    counter.get(),
                    name = counter.name(),
                )
            })
            .collect()
    }

    /// All counters, in a stable order
    pub fn counters(&self) -> [&Counter; 7] {
        [
            &self.submitted,
            &self.accepted,
            &self.rejected,
            &self.transport_errors,
            &self.invalid_responses,
            &self.invalid_records,
            &self.dropped,
        ]
    }
}

impl Default for ReporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ReporterMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterSnapshot {
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub transport_errors: u64,
    pub invalid_responses: u64,
    pub invalid_records: u64,
    pub dropped: u64,
}

impl ReporterSnapshot {
    pub fn failures(&self) -> u64 {
        self.rejected
            + self.transport_errors
            + self.invalid_responses
            + self.invalid_records
            + self.dropped
    }

    /// Share of submitted records that were not acknowledged
    pub fn failure_rate(&self) -> f64 {
        if self.submitted == 0 {
            0.0
        } else {
            self.failures() as f64 / self.submitted as f64
        }
    }

    /// Records handed over but not yet resolved (still queued or in flight)
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.accepted + self.failures())
    }

    /// One-line summary for operators
    pub fn summary(&self) -> String {
        format!(
            "Telemetry: {} submitted, {} accepted, {} rejected, {} transport errors, \
             {} invalid responses, {} invalid records, {} dropped ({:.1}% failure rate)",
            self.submitted,
            self.accepted,
            self.rejected,
            self.transport_errors,
            self.invalid_responses,
            self.invalid_records,
            self.dropped,
            self.failure_rate() * 100.0,
        )
    }
}

/// Thread-safe shared metrics
pub type SharedReporterMetrics = Arc<ReporterMetrics>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counter() {
        let counter = Counter::new("test_total", "Test counter");
        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
        assert_eq!(counter.name(), "test_total");
        assert_eq!(counter.description(), "Test counter");
    }

    #[test]
    fn test_record_outcome_routes_to_counter() {
        let metrics = ReporterMetrics::new();

        metrics.record_outcome(&SubmitOutcome::Accepted {
            status: 201,
            body: json!({"success": true}),
        });
        metrics.record_outcome(&SubmitOutcome::Rejected {
            status: 500,
            body: "boom".to_string(),
        });
        metrics.record_outcome(&SubmitOutcome::Transport("connection refused".to_string()));
        metrics.record_outcome(&SubmitOutcome::InvalidBody {
            status: 200,
            error: "expected value".to_string(),
        });
        metrics.record_outcome(&SubmitOutcome::InvalidRecord("blank model".to_string()));

        assert_eq!(metrics.accepted.get(), 1);
        assert_eq!(metrics.rejected.get(), 1);
        assert_eq!(metrics.transport_errors.get(), 1);
        assert_eq!(metrics.invalid_responses.get(), 1);
        assert_eq!(metrics.invalid_records.get(), 1);
        assert_eq!(metrics.failures(), 4);
    }

    #[test]
    fn test_snapshot_rates() {
        let metrics = ReporterMetrics::new();
        for _ in 0..4 {
            metrics.submitted.inc();
        }
        metrics.accepted.inc();
        metrics.accepted.inc();
        metrics.rejected.inc();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 4);
        assert_eq!(snapshot.failures(), 1);
        assert_eq!(snapshot.pending(), 1);
        assert!((snapshot.failure_rate() - 0.25).abs() < f64::EPSILON);
        assert!(snapshot.summary().contains("4 submitted"));
    }

    #[test]
    fn test_empty_snapshot_has_zero_failure_rate() {
        let snapshot = ReporterMetrics::new().snapshot();
        assert_eq!(snapshot.failure_rate(), 0.0);
        assert_eq!(snapshot.pending(), 0);
    }

    #[test]
    fn test_render() {
        let metrics = ReporterMetrics::new();
        metrics.submitted.inc();
        metrics.dropped.inc();

        let text = metrics.render();
        assert!(text.contains("# TYPE usage_records_submitted_total counter\n"));
        assert!(text.contains("\nusage_records_submitted_total 1\n"));
        assert!(text.contains("\nusage_records_dropped_total 1\n"));
        assert!(text.contains("\nusage_records_accepted_total 0\n"));
        assert_eq!(text.lines().count(), 3 * metrics.counters().len());
    }
}
