//! Off-path delivery of usage records through a worker task

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::metrics::SharedReporterMetrics;
use super::record::UsageRecord;
use super::reporter::{HttpReporter, UsageReporter};

/// Default number of records that may wait for the worker
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Largest accepted queue capacity
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Enqueues records and returns immediately; a single worker task posts them
/// in submission order.
///
/// When the queue is full, or after [`UsageReporter::shutdown`], the record is
/// dropped and counted. Call `shutdown` before exit so queued records are sent.
pub struct BackgroundReporter {
    sender: RwLock<Option<mpsc::Sender<UsageRecord>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    capacity: usize,
    metrics: SharedReporterMetrics,
}

impl BackgroundReporter {
    /// Spawn the worker on the current Tokio runtime.
    ///
    /// `capacity` is clamped to `1..=MAX_QUEUE_CAPACITY`.
    pub fn spawn(reporter: HttpReporter, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_QUEUE_CAPACITY);
        let (sender, mut receiver) = mpsc::channel::<UsageRecord>(capacity);
        let metrics = reporter.metrics().unwrap_or_default();

        let worker = tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                reporter.deliver(record).await;
            }
            debug!("Telemetry worker stopped");
        });

        Self {
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            capacity,
            metrics,
        }
    }

    /// Records waiting in the queue
    pub fn queued(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, |sender| self.capacity - sender.capacity())
    }

    fn drop_record(&self, record: &UsageRecord, reason: &str) {
        self.metrics.dropped.inc();
        warn!(
            outcome = "dropped",
            project_id = %record.project_id,
            model = %record.model,
            reason,
            "Usage record dropped before dispatch"
        );
    }
}

#[async_trait]
impl UsageReporter for BackgroundReporter {
    async fn submit(&self, record: UsageRecord) {
        self.metrics.submitted.inc();

        let sender = self.sender.read().clone();
        let Some(sender) = sender else {
            self.drop_record(&record, "reporter shut down");
            return;
        };

        match sender.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => self.drop_record(&record, "queue full"),
            Err(TrySendError::Closed(record)) => self.drop_record(&record, "worker not running"),
        }
    }

    fn metrics(&self) -> Option<SharedReporterMetrics> {
        Some(self.metrics.clone())
    }

    /// Close the queue and wait until everything already queued is delivered
    async fn shutdown(&self) {
        drop(self.sender.write().take());

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "Telemetry worker ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_reporter() -> HttpReporter {
        HttpReporter::new("http://127.0.0.1:9/ingest", "key").unwrap()
    }

    fn invalid_record() -> UsageRecord {
        // Blank project id: resolved locally without any network traffic.
        UsageRecord::new("", "m", "p", 1, 1, 1)
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let background = BackgroundReporter::spawn(unreachable_reporter(), 8);
        let metrics = background.metrics().unwrap();

        for _ in 0..3 {
            background.submit(invalid_record()).await;
        }
        background.shutdown().await;

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 3);
        assert_eq!(snapshot.invalid_records, 3);
        assert_eq!(snapshot.pending(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_record() {
        let background = BackgroundReporter::spawn(unreachable_reporter(), 1);
        let metrics = background.metrics().unwrap();

        // The worker cannot run before we yield, so the second record finds
        // the single slot taken.
        background.submit(invalid_record()).await;
        assert_eq!(background.queued(), 1);
        background.submit(invalid_record()).await;

        assert_eq!(metrics.dropped.get(), 1);
        background.shutdown().await;
        assert_eq!(metrics.invalid_records.get(), 1);
        assert_eq!(background.queued(), 0);
    }

    #[tokio::test]
    async fn test_oversized_capacity_is_clamped() {
        let background = BackgroundReporter::spawn(unreachable_reporter(), usize::MAX);
        assert_eq!(background.capacity, MAX_QUEUE_CAPACITY);
        background.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_dropped() {
        let background = BackgroundReporter::spawn(unreachable_reporter(), 4);
        background.shutdown().await;
        background.submit(invalid_record()).await;

        let snapshot = background.metrics().unwrap().snapshot();
        assert_eq!(snapshot.submitted, 1);
        assert_eq!(snapshot.dropped, 1);

        // A second shutdown is a no-op.
        background.shutdown().await;
    }
}
