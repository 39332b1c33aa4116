//! # relval CLI entry point
//!
//! Parses command-line arguments, sets up logging, and runs the check.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relval_cli::check::{run_check, CheckArgs, EXIT_ERROR};

/// Validate release.json documents against a JSON Schema.
///
/// A `.json` input is one document; a `.jsonl` input holds one document per
/// line. Each document is reported as `N valid` until the first one that
/// fails, which is printed with its violations and ends the run.
#[derive(Parser, Debug)]
#[command(name = "relval", version = relval_cli::VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    check: CheckArgs,
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

    tracing::debug!(version = relval_cli::VERSION, "relval starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run_check(&cli.check, &mut out) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("cannot continue");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
