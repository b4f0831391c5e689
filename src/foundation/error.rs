/// Convenience result type used across covercraft.
pub type CoverResult<T> = Result<T, CoverError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only caller mistakes and unrecoverable IO reach this type. Missing assets, degenerate display
/// areas and out-of-range crop input are degraded in place and never surface as errors.
#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    /// Invalid user-provided design, config or crop data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be read or decoded where no fallback applies.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while rasterizing or encoding a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The notification relay refused or failed to accept a finished cover.
    ///
    /// The payload is the message shown to the end user.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    /// Build a [`CoverError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CoverError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CoverError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CoverError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`CoverError::Delivery`] value.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
