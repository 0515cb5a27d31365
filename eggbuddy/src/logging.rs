//! Tracing setup driven by the configured per-module levels.

use std::collections::BTreeMap;

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Map a level name as users tend to write it onto an `EnvFilter` level.
fn level_name(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" | "fatal" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

/// `info,engine::evaluate=debug,...` for the given module levels.
///
/// Unknown level names are skipped.
pub fn filter_directives(levels: &BTreeMap<String, String>) -> String {
    let mut directives = vec![DEFAULT_LEVEL.to_string()];
    for (module, level) in levels {
        match level_name(level) {
            Some(level) if !module.trim().is_empty() => directives.push(format!("{}={level}", module.trim())),
            _ => eprintln!("ignoring log level {level:?} for {module:?}"),
        }
    }
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` wins over the configured levels.
pub fn init(levels: &BTreeMap<String, String>) {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(filter_directives(levels)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    };
    // `init` also bridges the `log` records of the library crates.
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
