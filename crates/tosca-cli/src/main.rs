//! # tosca CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tosca_cli::inspect::{run_inspect, InspectArgs};
use tosca_cli::validate::{run_validate, ValidateArgs};

/// Exit code for failures that prevent validation from running at all.
const EXIT_LOAD_FAILURE: u8 = 2;

/// TOSCA type definition checker.
///
/// Validates group type definitions against their section schema, checks
/// metadata declarations, and resolves capabilities and derived_from chains.
#[derive(Parser, Debug)]
#[command(name = "tosca", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML file with resolution settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every group type in the given definition documents.
    Validate(ValidateArgs),

    /// Print the resolved view of one group type.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, config),
        Commands::Inspect(args) => run_inspect(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_LOAD_FAILURE)
        }
    }
}
