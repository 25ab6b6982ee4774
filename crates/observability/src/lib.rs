//! Tracing and logging setup shared by every polybase binary and test.

/// Initialize process-wide tracing with default settings.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&LoggingConfig::default());
}

pub use tracing::{LoggingConfig, init_with};

/// Tracing configuration (filters, output format).
pub mod tracing;
