//! # dvp CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dvp_cli::init::{run_init, InitArgs};
use dvp_cli::validate::{run_validate, ValidateArgs};

/// dvp: scaffold and validate virtualization plugins.
#[derive(Parser, Debug)]
#[command(name = "dvp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new plugin project from templates.
    Init(InitArgs),

    /// Validate a plugin config and its schema file.
    Validate(ValidateArgs),
}

/// `RUST_LOG` wins over `-v` when set.
fn log_filter(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    tracing::debug!(cwd = %cwd.display(), "dvp starting");

    let result = match cli.command {
        Commands::Init(args) => run_init(&args, &cwd),
        Commands::Validate(args) => run_validate(&args, &cwd),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
