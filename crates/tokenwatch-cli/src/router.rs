//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction};
use crate::{commands, logging};
use tokenwatch_core::config;
use tokenwatch_core::error::TokenwatchResult;
use tracing::debug;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> TokenwatchResult<()> {
    let config_path = cli.config.as_deref();

    // Config commands must work on a config that does not validate yet
    if let Commands::Config { action } = &cli.command {
        let resolved = config::resolve_config(config_path)?;
        logging::init(&resolved.logging, cli.verbose);
        return match action {
            ConfigAction::Show => commands::config::show(&resolved, cli.verbose),
            ConfigAction::Init { path, force } => {
                commands::config::init(path.as_deref().or(config_path), *force)
            }
        };
    }

    let loaded = config::load_config(config_path)?;
    logging::init(&loaded.logging, cli.verbose);
    let config = config::init(loaded)?;
    debug!(
        environment = config.environment(),
        provider = %config.model.provider,
        dispatch = %config.telemetry.dispatch,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Chat { prompt, user_id } => {
            commands::chat::execute(config, &prompt, user_id.as_deref(), cli.verbose).await
        }
        Commands::Demo => commands::demo::execute(config, cli.verbose).await,
        Commands::Report {
            model,
            provider,
            input_tokens,
            output_tokens,
            latency_ms,
            metadata,
        } => {
            let args = commands::report::ReportArgs {
                model,
                provider,
                input_tokens,
                output_tokens,
                latency_ms,
                metadata,
            };
            commands::report::execute(config, args).await
        }
        Commands::Config { .. } => unreachable!("config commands are routed before loading"),
    }
}
