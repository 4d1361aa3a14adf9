//! Sample conversation

use super::Session;
use crate::console::CliConsole;
use tokenwatch_core::config::Config;
use tokenwatch_core::error::TokenwatchResult;
use tokenwatch_core::llm::CompletionModel;

/// Prompts and the users they are attributed to
const DEMO_PROMPTS: [(&str, &str); 2] = [
    ("What is the capital of France?", "user-123"),
    ("Explain quantum computing in simple terms", "user-456"),
];

const PREVIEW_CHARS: usize = 100;

pub async fn execute(config: &Config, verbose: bool) -> TokenwatchResult<()> {
    let console = CliConsole::new(verbose);
    let session = Session::from_config(config)?;

    console.print_header(&format!(
        "Tokenwatch demo ({} via {})",
        session.model.model().provider(),
        config.telemetry.dispatch
    ));

    let result = run_prompts(&session, &console).await;
    session.finish(&console).await;
    result?;

    console.success("All examples completed");
    Ok(())
}

async fn run_prompts(session: &Session, console: &CliConsole) -> TokenwatchResult<()> {
    for (i, (prompt, user_id)) in DEMO_PROMPTS.iter().enumerate() {
        println!();
        console.field(&format!("Example {}", i + 1), prompt);

        let text = session.model.chat(prompt, Some(user_id)).await.map_err(|e| {
            console.error(&format!("Model call failed: {}", e));
            e
        })?;
        console.field("Response", &preview(&text, PREVIEW_CHARS));
    }
    Ok(())
}

/// First `max` characters, with an ellipsis when cut
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("Paris.", 100), "Paris.");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("héllo", 2), "hé...");
    }
}
