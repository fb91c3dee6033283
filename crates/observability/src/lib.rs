//! Tracing and logging setup shared by every binary.

/// Initialize process-wide logging with the `info` default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with_default("info");
}

/// Tracing configuration (filters, layers).
pub mod tracing;
