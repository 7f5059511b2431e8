//! Triage CLI - Command-line interface for the triage decision engine.

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use triage_cli::commands;
use triage_cli::{Cli, Command, Formatter};
use triage_engine::TriageEngine;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> triage_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    let formatter = Formatter::new(cli.format.into(), !cli.no_color);
    let engine = Arc::new(TriageEngine::new());

    match cli.command {
        Command::Evaluate(args) => {
            commands::execute_evaluate(args, &engine, &formatter)?;
        }
        Command::Batch(args) => {
            commands::execute_batch(args, engine, &formatter).await?;
        }
        Command::Catalog(args) => {
            commands::execute_catalog(args, &formatter)?;
        }
    }

    Ok(())
}
