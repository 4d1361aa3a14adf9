//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tokenwatch")]
#[command(about = "Track LLM token usage and latency per call")]
#[command(
    long_about = r#"Tokenwatch - report LLM token usage to an ingestion endpoint

USAGE:
  tokenwatch chat "your prompt"      # Run one tracked prompt
  tokenwatch demo                    # Run the two sample prompts
  tokenwatch report --model ...      # Submit a usage record by hand

UTILITY COMMANDS:
  tokenwatch config init             # Create config file
  tokenwatch config show             # Show resolved config (secrets masked)"#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file [default: ~/.config/tokenwatch/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one prompt to the configured model and report its usage
    Chat {
        /// Prompt text
        prompt: String,

        /// End user the call is attributed to
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Run the sample conversation
    Demo,

    /// Submit a usage record directly and print the endpoint's answer
    Report {
        /// Model name to record
        #[arg(long)]
        model: String,

        /// Provider name to record
        #[arg(long, default_value = "anthropic")]
        provider: String,

        #[arg(long)]
        input_tokens: u64,

        #[arg(long)]
        output_tokens: u64,

        #[arg(long, default_value_t = 0)]
        latency_ms: u64,

        /// Metadata entry, repeatable
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Display the resolved configuration with secrets masked
    Show,

    /// Write a configuration file with defaults
    Init {
        /// Where to write [default: --config, else ~/.config/tokenwatch/config.toml]
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
