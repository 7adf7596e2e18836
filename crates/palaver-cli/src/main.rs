//! Palaver CLI entry point.
//!
//! Binary name: `palaver`
//!
//! Parses CLI arguments, initializes tracing and the session, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    palaver_observe::tracing_setup::init_tracing(cli.log_filter(), cli.otel_enabled())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    if cli.otel && !cli.otel_enabled() {
        tracing::warn!("--otel is ignored for the interactive chat; span output would mix with the transcript");
    }

    let result = run(cli).await;
    palaver_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "palaver", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.ephemeral).await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await?,
        Commands::History => cli::history::show_history(&state, cli.json).await?,
        Commands::Clear { force } => cli::clear::clear_history(&state, force, cli.quiet).await?,
        Commands::Ask { text } => cli::ask::ask(&state, &text.join(" "), cli.json).await?,
        Commands::Config => cli::config::show_config(&state, cli.json)?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
