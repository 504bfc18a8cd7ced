/// Canvas and pixel types.
pub mod core;
/// Crate error type.
pub mod error;
