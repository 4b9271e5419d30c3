mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use chatbench_core::{PresetClient, paths};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        completions::generate_completions(shell);
        return;
    }

    // Logs go to a file so streamed replies on stdout stay clean.
    let _guard = match paths::logs_dir() {
        Ok(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "chatbench.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let default_level = if cli.verbose { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
                )
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .init();
            Some(guard)
        }
        Err(_) => None,
    };

    let config = config::CliConfig::load();
    let server_url = config.server_url(cli.server.as_deref());
    tracing::debug!(server = %server_url, "chatbench cli starting");

    let result = match cli.command {
        Commands::Chat(args) => commands::chat::run(&server_url, &config, args, cli.format).await,
        Commands::Preset { command } => {
            commands::preset::run(PresetClient::new(&server_url), command, cli.format).await
        }
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(err) = result {
        error::handle_error(err);
    }
}
