//! Confsnap - application configuration discovery and backup
//!
//! Command line entry point: parses arguments, initialises logging, loads
//! configuration and dispatches to the command implementations.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "debug" } else { "info,confsnap=debug" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = context::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            commands::run::run(&config, args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve(args) => {
            commands::resolve::run(&config, args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ValidateHints(args) => {
            let valid = commands::validate_hints::run(&config, &args)?;
            Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting confsnap v{}", env!("CARGO_PKG_VERSION"));

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
