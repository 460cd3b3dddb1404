//! Logging setup using `tracing-subscriber`
//!
//! Library code reports through `tracing` macros. Unmatched normalization
//! values are `warn` events, so they show at the default level; stage
//! progress is `info` and per-step details are `debug`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a filter directive
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
