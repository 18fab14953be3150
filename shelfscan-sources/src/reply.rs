//! Buffered vendor replies.
//!
//! Each source reads the HTTP response into a [`VendorReply`] and hands it
//! to a pure `interpret` function. Keeping classification away from the
//! socket lets the parsers be tested with canned bodies.

use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use shelfscan_fetch::host::http::{quota_from_headers, retry_after_from_headers};
use shelfscan_fetch::{LookupError, VendorQuota};
use tracing::debug;

/// Longest body excerpt carried into an error message.
const EXCERPT_LEN: usize = 200;

/// Status, headers, and body of one vendor response.
#[derive(Debug, Clone)]
pub struct VendorReply {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl VendorReply {
    /// Creates a reply from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a 200 reply with no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }

    /// Reads a live response to the end.
    pub async fn read(response: Response) -> Result<Self, LookupError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(format!("Failed to read body: {}", e.without_url())))?;
        debug!(%status, bytes = body.len(), "Vendor reply read");
        Ok(Self::new(status, headers, body))
    }

    /// Returns quota numbers from the rate-limit headers, if any.
    pub fn quota(&self) -> Option<VendorQuota> {
        quota_from_headers(&self.headers, Utc::now())
    }

    /// Returns true for a 429.
    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Builds the rate-limited error for this reply.
    pub fn rate_limited(&self) -> LookupError {
        LookupError::RateLimited {
            retry_after: retry_after_from_headers(&self.headers),
            quota: self.quota(),
        }
    }

    /// Builds a transport error naming the status and a body excerpt.
    pub fn unexpected_status(&self) -> LookupError {
        let excerpt: String = self.body.chars().take(EXCERPT_LEN).collect();
        let excerpt = excerpt.trim();
        if excerpt.is_empty() {
            LookupError::Transport(format!("HTTP {}", self.status))
        } else {
            LookupError::Transport(format!("HTTP {}: {excerpt}", self.status))
        }
    }
}
