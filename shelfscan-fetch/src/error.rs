//! Fetch error types.

use std::time::Duration;

use shelfscan_core::{AttemptOutcome, OperationKind};
use thiserror::Error;

use crate::budget::VendorQuota;

// ============================================================================
// Lookup Error
// ============================================================================

/// Error reported by a source adapter for one call.
///
/// None of these is fatal to a resolution: the resolver records the error
/// and moves on to the next source.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The source lacks a credential. Checked before any network I/O.
    #[error("Source not configured: {0}")]
    Unconfigured(String),

    /// The vendor answered 429.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
        /// Vendor-reported quota, when the response carried one.
        quota: Option<VendorQuota>,
    },

    /// The vendor answered successfully with zero matches.
    #[error("No matching product")]
    NotFound,

    /// Network error, timeout, unreadable body, or non-2xx status other than 429.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The source does not implement this operation kind.
    #[error("Operation not supported: {0}")]
    Unsupported(OperationKind),

    /// The key is not acceptable to this source.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// The four adapter failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing credential.
    Unconfigured,
    /// Vendor-side rate limit.
    RateLimited,
    /// No match.
    NotFound,
    /// Anything else that went wrong on the way.
    TransportFailure,
}

impl LookupError {
    /// Collapses the error into one of the four failure kinds.
    ///
    /// Keys a source cannot handle count as "no match" from that source.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unconfigured(_) => FailureKind::Unconfigured,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::NotFound | Self::Unsupported(_) | Self::InvalidKey(_) => FailureKind::NotFound,
            Self::Transport(_) => FailureKind::TransportFailure,
        }
    }

    /// Maps the error to the outcome recorded in a resolution attempt.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Unsupported(_) => AttemptOutcome::SkippedUnsupported,
            other => match other.kind() {
                FailureKind::Unconfigured => AttemptOutcome::Unconfigured,
                FailureKind::RateLimited => AttemptOutcome::RateLimited,
                FailureKind::NotFound => AttemptOutcome::NotFound,
                FailureKind::TransportFailure => AttemptOutcome::TransportFailure,
            },
        }
    }

    /// Returns the vendor retry hint, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the vendor quota carried by the error, if any.
    pub fn quota(&self) -> Option<&VendorQuota> {
        match self {
            Self::RateLimited { quota, .. } => quota.as_ref(),
            _ => None,
        }
    }

    /// Creates a transport error for a call that exceeded its deadline.
    pub fn timeout(after: Duration) -> Self {
        Self::Transport(format!("timed out after {}ms", after.as_millis()))
    }
}

impl From<HttpError> for LookupError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("unreadable response body: {err}"))
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_collapses_to_four() {
        assert_eq!(
            LookupError::Unconfigured("x".into()).kind(),
            FailureKind::Unconfigured
        );
        assert_eq!(
            LookupError::Unsupported(OperationKind::Search).kind(),
            FailureKind::NotFound
        );
        assert_eq!(
            LookupError::InvalidKey("bad".into()).kind(),
            FailureKind::NotFound
        );
        assert_eq!(
            LookupError::Transport("boom".into()).kind(),
            FailureKind::TransportFailure
        );
    }

    #[test]
    fn test_outcome_mapping() {
        let limited = LookupError::RateLimited {
            retry_after: Some(60),
            quota: None,
        };
        assert_eq!(limited.outcome(), AttemptOutcome::RateLimited);
        assert_eq!(limited.retry_after(), Some(60));
        assert_eq!(
            LookupError::Unsupported(OperationKind::Search).outcome(),
            AttemptOutcome::SkippedUnsupported
        );
        assert_eq!(LookupError::NotFound.outcome(), AttemptOutcome::NotFound);
    }

    #[test]
    fn test_timeout_message() {
        let err = LookupError::timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Transport failure: timed out after 5000ms");
    }
}
