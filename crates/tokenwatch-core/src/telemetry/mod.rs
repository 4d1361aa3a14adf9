//! Usage telemetry: records, reporters and their outcome counters
//!
//! A [`UsageRecord`] describes one model invocation. Reporters deliver records
//! to the ingestion endpoint:
//!
//! - [`HttpReporter`] posts inline and waits for the response
//! - [`BackgroundReporter`] queues records for a worker task
//! - [`NoopReporter`] discards them
//!
//! Delivery failures are logged and counted in [`ReporterMetrics`]; they never
//! reach the caller.

pub mod background;
pub mod metrics;
pub mod record;
pub mod reporter;

pub use background::{BackgroundReporter, DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY};
pub use metrics::{Counter, ReporterMetrics, ReporterSnapshot, SharedReporterMetrics};
pub use record::{Metadata, UsageRecord};
pub use reporter::{HttpReporter, NoopReporter, SubmitOutcome, UsageReporter, build_reporter};
