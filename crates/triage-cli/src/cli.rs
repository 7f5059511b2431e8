//! CLI command definitions and argument parsing.

use crate::output::OutputFormat;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Triage CLI - Evaluate issue Signal Sets into triage Verdicts.
#[derive(Debug, Parser)]
#[command(name = "triage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (tiers and ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate one issue
    Evaluate(EvaluateArgs),

    /// Evaluate many issues against a shared candidate pool
    Batch(BatchArgs),

    /// Inspect rule catalogs
    Catalog(CatalogArgs),
}

/// Arguments for the evaluate command.
#[derive(Debug, Parser)]
pub struct EvaluateArgs {
    /// Evaluation request JSON file ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Rule catalog TOML file, overriding the request's catalog source
    #[arg(short, long, env = "TRIAGE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Evaluation timestamp (Unix seconds), overriding the request's
    #[arg(long)]
    pub at: Option<i64>,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Batch request JSON file ("-" for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Rule catalog TOML file, overriding the request's catalog source
    #[arg(short, long, env = "TRIAGE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Targets evaluated at once
    #[arg(long, default_value_t = triage_engine::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

/// Arguments for catalog inspection.
#[derive(Debug, Parser)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog actions.
#[derive(Debug, Subcommand)]
pub enum CatalogAction {
    /// Load a catalog and report its areas and warnings
    Check {
        /// Rule catalog TOML file (built-in default when omitted)
        #[arg(short, long, env = "TRIAGE_CATALOG")]
        catalog: Option<PathBuf>,

        /// Fail instead of falling back when the catalog has problems
        #[arg(long)]
        strict: bool,
    },

    /// Print the built-in default catalog as TOML
    Default,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

impl Cli {
    /// Default log filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
