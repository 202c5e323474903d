//! Binary crate for the `metar` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.verbose);
    cmd.run()
}

/// Logs go to stderr so decoded output stays pipeable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("metar_core={level},metar={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
