//! Core error types for shelfscan.

use thiserror::Error;

/// Core error type for shelfscan operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The lookup key could not be interpreted.
    #[error("Invalid lookup key: {0}")]
    InvalidKey(String),

    /// Unknown source identifier.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Unknown operation kind.
    #[error("Unknown operation kind: {0}")]
    UnknownOperation(String),

    /// Invalid data from a vendor response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
