//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Settings hold a value that cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = StoreError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.is_not_found());

        let err = StoreError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(!err.is_not_found());

        assert!(!StoreError::Config("bad".into()).is_not_found());
    }
}
