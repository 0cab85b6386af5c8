//! a11y-lint CLI tool.
//!
//! Usage:
//! ```bash
//! a11y-lint scan [OPTIONS] [PATH]
//! a11y-lint list-checks
//! a11y-lint init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod collector;
mod commands;
mod config_resolver;

/// Static accessibility analyzer for component markup and style sheets
#[derive(Parser)]
#[command(name = "a11y-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and score each unit
    Scan(ScanArgs),

    /// List available checks
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Tier to run (quick, standard, full or a configured tier)
    #[arg(long, conflicts_with = "check")]
    pub tier: Option<String>,

    /// Run a single check by id or code
    #[arg(long)]
    pub check: Option<String>,

    /// Run checks on a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Maximum number of pool workers (implies --parallel)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Report every finding on its own file instead of its shared ancestor
    #[arg(long)]
    pub no_collapse: bool,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Output format for scan reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-issue compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => {
            let source = config_resolver::resolve(&args.path, cli.config.as_deref());
            commands::scan::run(&args, &source)
        }
        Commands::ListChecks => {
            let source = config_resolver::resolve(std::path::Path::new("."), cli.config.as_deref());
            commands::list_checks::run(&source)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
