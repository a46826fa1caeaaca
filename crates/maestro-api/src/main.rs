//! Maestro CLI entry point.
//!
//! Binary name: `maestro`
//!
//! Parses CLI arguments, initializes tracing and the process-lifetime
//! workflow store, then dispatches to the requested host mode.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use maestro_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "maestro", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(cli.data_dir.clone(), cli.config.clone()).await?;

    let result = match &cli.command {
        Commands::Exec { request } => cli::host::exec(&state, request, cli.pretty).await,
        Commands::Batch { file } => cli::host::batch(&state, file, cli.pretty).await,
        Commands::Stdio { events } => cli::host::stdio(&state, cli.pretty, *events).await,
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
