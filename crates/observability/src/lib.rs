//! `salonkit-observability` — process-wide tracing/logging setup.
//!
//! One `init()` per binary; library crates only emit through `tracing`
//! macros and never install subscribers themselves.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// JSON output with timestamps, filtered via `RUST_LOG` (default `info`).
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_default_filter("info");
}

/// [`init`] with an explicit fallback filter for when `RUST_LOG` is unset.
pub fn init_with_default_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
