/// Convenience result type used across regen.
pub type RegenResult<T> = Result<T, RegenError>;

/// Top-level error taxonomy used by the regeneration APIs.
#[derive(thiserror::Error, Debug)]
pub enum RegenError {
    /// Invalid user-provided configuration (paths, canvas size).
    #[error("validation error: {0}")]
    Validation(String),

    /// A metadata record could not be interpreted.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// A layer file could not be located or decoded.
    #[error("layer error: {0}")]
    Layer(String),

    /// Compositing contract violations (mismatched buffers, bad dimensions).
    #[error("render error: {0}")]
    Render(String),

    /// The output directory can no longer be written; continuing is meaningless.
    #[error("output error: {0}")]
    Output(String),

    /// A run was requested while another one is still in flight.
    #[error("a regeneration is already in progress")]
    Busy,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegenError {
    /// Build a [`RegenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RegenError::Metadata`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Build a [`RegenError::Layer`] value.
    pub fn layer(msg: impl Into<String>) -> Self {
        Self::Layer(msg.into())
    }

    /// Build a [`RegenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RegenError::Output`] value.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Return `true` for errors that must end the whole run instead of a single record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Output(_) | Self::Validation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
