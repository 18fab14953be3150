//! eBay-specific errors.

use shelfscan_fetch::LookupError;
use thiserror::Error;

use super::ID;

/// eBay-specific errors.
#[derive(Debug, Clone, Error)]
pub enum EbayError {
    /// Neither a token nor a client id and secret is set.
    #[error("No eBay credential configured")]
    NoCredential,

    /// The client-credentials exchange failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// eBay answered 401 to a Browse call.
    #[error("Access token rejected")]
    TokenRejected,

    /// The token cannot be sent as a header.
    #[error("Access token contains invalid characters")]
    InvalidToken,
}

impl From<EbayError> for LookupError {
    fn from(err: EbayError) -> Self {
        match err {
            EbayError::NoCredential => LookupError::Unconfigured(ID.to_string()),
            other => LookupError::Transport(other.to_string()),
        }
    }
}
