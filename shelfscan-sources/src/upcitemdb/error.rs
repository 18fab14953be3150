//! UPCitemdb error codes.

use shelfscan_fetch::LookupError;
use thiserror::Error;

/// Error codes UPCitemdb returns in the `code` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpcItemDbError {
    /// The code is not a valid UPC/EAN.
    #[error("Invalid UPC")]
    InvalidUpc,

    /// The search query was rejected.
    #[error("Invalid query")]
    InvalidQuery,

    /// No product matched.
    #[error("Not found")]
    NotFound,

    /// Daily quota spent.
    #[error("Daily limit exceeded")]
    ExceedLimit,

    /// Calls too close together.
    #[error("Requests too fast")]
    TooFast,

    /// Any other code.
    #[error("{code}: {message}")]
    Other {
        /// Vendor code.
        code: String,
        /// Vendor message.
        message: String,
    },
}

impl UpcItemDbError {
    /// Maps a vendor code and message.
    pub fn from_code(code: &str, message: Option<&str>) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "INVALID_UPC" => Self::InvalidUpc,
            "INVALID_QUERY" => Self::InvalidQuery,
            "NOT_FOUND" => Self::NotFound,
            "EXCEED_LIMIT" => Self::ExceedLimit,
            "TOO_FAST" => Self::TooFast,
            _ => Self::Other {
                code: code.to_string(),
                message: message.unwrap_or_default().to_string(),
            },
        }
    }

    /// Returns true for the two throttling codes.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::ExceedLimit | Self::TooFast)
    }
}

impl From<UpcItemDbError> for LookupError {
    fn from(err: UpcItemDbError) -> Self {
        match err {
            UpcItemDbError::InvalidUpc | UpcItemDbError::InvalidQuery | UpcItemDbError::NotFound => {
                LookupError::NotFound
            }
            UpcItemDbError::ExceedLimit | UpcItemDbError::TooFast => LookupError::RateLimited {
                retry_after: None,
                quota: None,
            },
            other @ UpcItemDbError::Other { .. } => LookupError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_fetch::FailureKind;

    #[test]
    fn test_code_mapping() {
        assert_eq!(UpcItemDbError::from_code("INVALID_UPC", None), UpcItemDbError::InvalidUpc);
        assert_eq!(UpcItemDbError::from_code("too_fast", None), UpcItemDbError::TooFast);
        assert!(UpcItemDbError::from_code("EXCEED_LIMIT", None).is_rate_limit());

        let other = UpcItemDbError::from_code("SERVER_ERR", Some("Internal error"));
        assert_eq!(other.to_string(), "SERVER_ERR: Internal error");
        assert_eq!(LookupError::from(other).kind(), FailureKind::TransportFailure);
    }

    #[test]
    fn test_invalid_upc_is_not_found() {
        let err = LookupError::from(UpcItemDbError::InvalidUpc);
        assert_eq!(err.kind(), FailureKind::NotFound);
    }
}
