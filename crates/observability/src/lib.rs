//! Tracing/logging setup shared by every console binary and test harness.

/// Initialize process-wide logging with the defaults (`RUST_LOG`, JSON).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::LogConfig::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;
