//! Manual usage record submission

use crate::console::CliConsole;
use serde_json::Value;
use tokenwatch_core::config::Config;
use tokenwatch_core::error::{TokenwatchError, TokenwatchResult};
use tokenwatch_core::telemetry::{HttpReporter, Metadata, SubmitOutcome, UsageRecord};

/// Record fields taken from the command line
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub model: String,
    pub provider: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    pub metadata: Vec<(String, String)>,
}

impl ReportArgs {
    fn into_record(self, project_id: &str) -> UsageRecord {
        let metadata: Metadata = self
            .metadata
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        UsageRecord::new(
            project_id,
            self.model,
            self.provider,
            self.input_tokens,
            self.output_tokens,
            self.latency_ms,
        )
        .with_metadata(metadata)
    }
}

/// Send one record inline and print what the endpoint said
pub async fn execute(config: &Config, args: ReportArgs) -> TokenwatchResult<()> {
    let console = CliConsole::new(true);
    let telemetry = &config.telemetry;
    if !telemetry.enabled {
        return Err(TokenwatchError::config_field(
            "Telemetry is disabled; nothing to report to",
            "telemetry.enabled",
        ));
    }

    let endpoint = telemetry.endpoint_url.as_deref().unwrap_or_default();
    let api_key = telemetry.api_key.clone().unwrap_or_default();
    let reporter = HttpReporter::new(endpoint, api_key)?;
    let record = args.into_record(telemetry.project_id()?);

    console.info(&format!("Sending usage record to {}", reporter.endpoint_url()));
    let outcome = reporter.send(&record).await;
    print_outcome(&console, &outcome);

    if outcome.is_success() {
        Ok(())
    } else {
        Err(TokenwatchError::other(format!(
            "Usage record not accepted ({})",
            outcome.label()
        )))
    }
}

fn print_outcome(console: &CliConsole, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Accepted { status, body } => {
            console.success(&format!("Accepted (HTTP {})", status));
            console.field("Response", &body.to_string());
        }
        SubmitOutcome::Rejected { status, body } => {
            console.error(&format!("Rejected (HTTP {}): {}", status, body));
        }
        SubmitOutcome::Transport(error) => {
            console.error(&format!("Request failed: {}", error));
        }
        SubmitOutcome::InvalidBody { status, error } => {
            console.error(&format!("HTTP {} with unreadable body: {}", status, error));
        }
        SubmitOutcome::InvalidRecord(error) => {
            console.error(&format!("Invalid record: {}", error));
        }
    }
}
