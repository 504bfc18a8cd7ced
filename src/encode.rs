//! Output sinks for finished records.

/// Sink trait and built-in sinks.
pub mod sink;
