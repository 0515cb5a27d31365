//! EggBuddy.
//!
//! Decides which scanned eggs to keep and tracks breeding progress per wipe.

mod cli;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let path = match &args.config {
        Some(path) => path.clone(),
        None => config::Config::path()?,
    };

    let (config, load_error) = match config::Config::try_load_from(&path) {
        Ok(cfg) => (cfg, None),
        Err(err) => (config::Config::default(), Some(err)),
    };

    // Structured logging. `RUST_LOG` overrides the configured levels.
    logging::init(&config.log_levels);
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "failed to load config; using defaults");
    }

    cli::run(args.command, config, &path)
}
