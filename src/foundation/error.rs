/// Convenience result type used across the engine.
pub type MathplotResult<T> = Result<T, MathplotError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MathplotError {
    /// Invalid user-provided drawable or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Backend construction or surface failures.
    #[error("backend error: {0}")]
    Backend(String),

    /// Errors while resolving style configuration values.
    #[error("style error: {0}")]
    Style(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MathplotError {
    /// Build a [`MathplotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MathplotError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`MathplotError::Style`] value.
    pub fn style(msg: impl Into<String>) -> Self {
        Self::Style(msg.into())
    }

    /// Build a [`MathplotError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
