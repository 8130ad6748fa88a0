//! netscore - trust scoring CLI for GitHub and npm packages
//!
//! Scores URL lists into NDJSON records and exposes the registry's version
//! and dependency-size utilities on the command line.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use netscore::config::LogLevel;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter from `--log-level`, then `LOG_LEVEL` (0/1/2), then `RUST_LOG`
fn log_filter(cli_level: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level);
    }
    match std::env::var("LOG_LEVEL") {
        Ok(value) => EnvFilter::new(LogLevel::from_env_value(&value).directive()),
        Err(_) => EnvFilter::from_default_env(),
    }
}

fn init_logging(cli_level: Option<&str>) -> Result<()> {
    let filter = log_filter(cli_level);
    let log_file = std::env::var("LOG_FILE")
        .ok()
        .filter(|p| !p.trim().is_empty());

    // LOG_FILE replaces stderr as the destination
    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.log_level.as_deref())?;
    cli::run(cli)
}
