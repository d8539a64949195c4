//! jwt-audit: an offline security auditor for JSON Web Tokens.
//!
//! Entry point for the application. Parses CLI arguments and delegates
//! to the appropriate command handler.

#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Exit code for an audit that completed and found something.
const EXIT_FINDINGS: u8 = 2;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Decode(args) => {
            commands::decode::execute(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Audit(args) => {
            let result = commands::audit::execute(args)?;
            Ok(if result.has_findings() {
                ExitCode::from(EXIT_FINDINGS)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
