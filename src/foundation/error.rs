/// Convenience result type used across the crate.
pub type CosmosResult<T> = Result<T, CosmosError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CosmosError {
    /// Invalid user-provided definition or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while building particle populations.
    #[error("generation error: {0}")]
    Generation(String),

    /// Errors while scheduling or evaluating a timeline.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// A referenced stage handle is not live yet.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CosmosError {
    /// Build a [`CosmosError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CosmosError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`CosmosError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`CosmosError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`CosmosError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
