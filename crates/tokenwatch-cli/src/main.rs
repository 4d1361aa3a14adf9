//! Tokenwatch CLI
//!
//! Runs prompts through a tracked model client and reports token usage to an
//! ingestion endpoint.
//!
//! ```bash
//! tokenwatch chat "What is the capital of France?" --user-id user-123
//! tokenwatch demo
//! tokenwatch report --model claude-3-sonnet --input-tokens 12 --output-tokens 3
//! tokenwatch config show
//! ```

mod args;
mod commands;
mod console;
mod logging;
mod router;

use clap::Parser;
use tokenwatch_core::error::TokenwatchResult;

use args::Cli;

#[tokio::main]
async fn main() -> TokenwatchResult<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
