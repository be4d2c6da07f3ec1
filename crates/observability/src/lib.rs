//! Process-wide tracing/logging setup.

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize process-wide logging with the default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
