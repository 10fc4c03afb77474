//! # tfe-runs
//!
//! Command-line entry point for the run orchestration client.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod commands;

use cli::Cli;

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing()?;

    debug!(organization = %cli.organization, workspace = %cli.workspace, base_url = %cli.base_url, "starting");
    match commands::execute(cli).await {
        Ok(code) => Ok(code),
        Err(err) => {
            if commands::is_recoverable(&err) {
                warn!("{:#} (retrying later may succeed)", err);
            } else {
                error!("{:#}", err);
            }
            Ok(commands::failure_code(&err))
        }
    }
}
