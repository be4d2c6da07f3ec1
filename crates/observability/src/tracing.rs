//! Tracing/logging initialization.
//!
//! Logs are emitted as JSON lines with timestamps. The filter comes from
//! `RUST_LOG` (e.g. `RUST_LOG=branches_api=debug,sqlx=warn`).

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process, falling back to `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
