//! Tracing initialisation for the CLI.
//!
//! Diagnostics go to stderr through `tracing`; command output stays on
//! stdout so it can be piped.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter (falls back to `RUST_LOG`).
pub const LOG_ENV: &str = "BERTH_LOG";

/// Install the global subscriber.
///
/// `verbose` raises the default filter from `berth=warn` to `berth=debug`;
/// an explicit `BERTH_LOG`/`RUST_LOG` always wins.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "berth=debug" } else { "berth=warn" };
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());

    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
