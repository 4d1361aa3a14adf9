//! One tracked prompt

use super::Session;
use crate::console::CliConsole;
use tokenwatch_core::config::Config;
use tokenwatch_core::error::TokenwatchResult;

pub async fn execute(
    config: &Config,
    prompt: &str,
    user_id: Option<&str>,
    verbose: bool,
) -> TokenwatchResult<()> {
    let console = CliConsole::new(verbose);
    let session = Session::from_config(config)?;

    let result = session.model.chat(prompt, user_id).await;
    session.finish(&console).await;

    let text = result.map_err(|e| {
        console.error(&format!("Model call failed: {}", e));
        e
    })?;
    println!("{}", text);
    Ok(())
}
