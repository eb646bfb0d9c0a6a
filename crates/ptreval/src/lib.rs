//! # ptreval
//!
//! **CLI Binary**
//!
//! This is the entry point for the `ptreval` command-line application.
//! It orchestrates the other crates through the evaluation stages:
//! discover, distribute, summarize, compare and report.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Install logging
//! * Load and resolve the evaluation profile
//! * Dispatch commands and lay out the output directory
//! * Handle errors and exit codes
//!
//! This crate should contain minimal business logic.

mod commands;
mod config;
mod error_hints;
mod host;
mod progress;
mod timings;

use anyhow::Result;
use clap::Parser;
use ptreval_config::Cli;
use tracing_subscriber::EnvFilter;

/// Default log level for a `-v` count. `RUST_LOG` takes precedence.
fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by the `ptreval` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    commands::dispatch(cli)
}

/// Render an error with remediation hints.
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}
