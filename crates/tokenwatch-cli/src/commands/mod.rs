//! CLI commands

pub mod chat;
pub mod config;
pub mod demo;
pub mod report;

use crate::console::CliConsole;
use std::sync::Arc;
use tokenwatch_core::config::Config;
use tokenwatch_core::error::TokenwatchResult;
use tokenwatch_core::llm::ModelClient;
use tokenwatch_core::telemetry::{UsageReporter, build_reporter};
use tokenwatch_core::TrackedModel;

/// Reporter plus the tracked model client built from configuration
pub struct Session {
    pub reporter: Arc<dyn UsageReporter>,
    pub model: TrackedModel<ModelClient>,
}

impl Session {
    pub fn from_config(config: &Config) -> TokenwatchResult<Self> {
        let reporter = build_reporter(&config.telemetry)?;
        let client = ModelClient::from_config(&config.model)?;
        let model = TrackedModel::from_config(client, reporter.clone(), config)?;
        Ok(Self { reporter, model })
    }

    /// Flush pending records and print the delivery summary
    pub async fn finish(self, console: &CliConsole) {
        self.reporter.shutdown().await;
        if let Some(metrics) = self.reporter.metrics() {
            let snapshot = metrics.snapshot();
            if snapshot.failures() > 0 {
                console.warn(&snapshot.summary());
            } else {
                console.info(&snapshot.summary());
            }
            console.detail(&metrics.render());
        }
    }
}
