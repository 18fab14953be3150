// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! shelfscan CLI - product lookup by UPC or name from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Look up a UPC
//! shelfscan lookup 889698572705
//!
//! # Search by name, narrowed by brand
//! shelfscan search "wonder woman pop" --brand Funko
//!
//! # JSON output
//! shelfscan --format json --pretty lookup 889698572705
//!
//! # Only ask one source
//! shelfscan --source ebay lookup 889698572705
//!
//! # List sources and remaining budgets
//! shelfscan sources
//!
//! # Reset a budget by hand
//! shelfscan budget reset --source upcitemdb --kind lookup
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use shelfscan_core::CoreError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{budget, config, lookup, search, sources};

// ============================================================================
// CLI Definition
// ============================================================================

/// shelfscan CLI - product lookup across UPC databases and marketplaces.
#[derive(Parser)]
#[command(name = "shelfscan")]
#[command(about = "Product lookup by UPC or name across several sources")]
#[command(long_about = r#"
shelfscan resolves a product code or name into one normalized product record,
asking each configured source in priority order until one answers.

Sources:
  • UPCitemdb (upcitemdb)           works without a key on the trial plan
  • Barcode Lookup (barcodelookup)  needs SHELFSCAN_BARCODELOOKUP_KEY
  • eBay (ebay)                     needs SHELFSCAN_EBAY_TOKEN or client keys

Examples:
  shelfscan lookup 889698572705          # By UPC/EAN/GTIN
  shelfscan search "mug" --brand Ikea    # By name
  shelfscan --format json lookup 0123…   # JSON output
  shelfscan sources                      # Sources and budgets
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Sources to use, comma-separated: "upcitemdb,ebay".
    #[arg(long, short, global = true)]
    pub source: Option<String>,

    /// Per-call timeout in seconds (overrides settings).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Do not load or save budget counters.
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Settings file to use instead of the default.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Look up a product by UPC, EAN or GTIN.
    #[command(visible_alias = "l")]
    Lookup(lookup::LookupArgs),

    /// Search for a product by name.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// List sources with priority, configuration and budgets.
    Sources,

    /// Show or reset rate budgets.
    #[command(visible_alias = "b")]
    Budget(budget::BudgetArgs),

    /// Show configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Product found, or command succeeded.
    Success = 0,
    /// General error.
    Error = 1,
    /// No source produced a product.
    NotFound = 2,
    /// The input could not be used.
    InvalidInput = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<CoreError>().is_some() {
            Self::InvalidInput
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("shelfscan=debug,info")
    } else {
        EnvFilter::new("shelfscan=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Lookup(args) => lookup::run(args, &cli).await,
        Commands::Search(args) => search::run(args, &cli).await,
        Commands::Sources => sources::run(&cli).await,
        Commands::Budget(args) => budget::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            ExitCode::for_error(&e)
        }
    };

    if code != ExitCode::Success {
        std::process::exit(code as i32);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shelfscan",
            "lookup",
            "889698572705",
            "--format",
            "json",
            "--source",
            "ebay",
            "--no-persist",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.source.as_deref(), Some("ebay"));
        assert!(cli.no_persist);
        assert!(matches!(cli.command, Commands::Lookup(_)));
    }

    #[test]
    fn test_exit_code_for_invalid_key() {
        let err = anyhow::Error::new(CoreError::InvalidKey("x".into()));
        assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);

        let err = anyhow::anyhow!("disk full");
        assert_eq!(ExitCode::for_error(&err), ExitCode::Error);
    }
}
