//! HTTP client with tracing and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist, so adapters only talk to their vendors
//! - Helpers for vendor rate-limit headers

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, header, header::HeaderMap};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::budget::VendorQuota;
use crate::error::HttpError;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// User agent string for shelfscan.
const USER_AGENT: &str = concat!("shelfscan/", env!("CARGO_PKG_VERSION"));

/// Hosts the vendor adapters talk to.
pub const VENDOR_DOMAINS: [&str; 3] = ["upcitemdb.com", "barcodelookup.com", "ebay.com"];

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// If the configured builder fails (broken TLS setup), falls back to a
    /// client with reqwest defaults and logs a warning.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, using defaults");
                Client::new()
            });

        Self {
            inner: client,
            allowed_domains: None,
        }
    }

    /// Creates a client restricted to the vendor hosts.
    pub fn for_vendors(timeout: Duration) -> Self {
        Self::with_timeout(timeout)
            .allow_domains(VENDOR_DOMAINS.iter().map(ToString::to_string).collect())
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn allow_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request.
    pub async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.get_with_headers(url, HeaderMap::new()).await
    }

    /// Performs a GET request with custom headers.
    ///
    /// The URL may carry credentials in its query, so only its host is logged.
    #[instrument(skip(self, url, headers), fields(host = %host_of(url)))]
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request");

        let response = self
            .inner
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(classify)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with form data and basic auth.
    ///
    /// Neither credential nor form is logged.
    #[instrument(skip(self, url, username, password, form), fields(host = %host_of(url)))]
    pub async fn post_form_basic_auth<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        username: &str,
        password: &str,
        form: &T,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("POST request with form data");

        let response = self
            .inner
            .post(url)
            .basic_auth(username, Some(password))
            .form(form)
            .send()
            .await
            .map_err(classify)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Request(err.without_url())
    }
}

fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .unwrap_or_default()
}

// ============================================================================
// Rate-Limit Headers
// ============================================================================

/// Reads the `Retry-After` header as seconds.
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Reads `X-RateLimit-*` headers.
///
/// Returns `None` unless `X-RateLimit-Remaining` is present and numeric.
/// `X-RateLimit-Reset` is read as a Unix timestamp when it looks like one,
/// otherwise as seconds from `now`.
pub fn quota_from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Option<VendorQuota> {
    let number = |name: &str| -> Option<i64> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    let remaining = u32::try_from(number("x-ratelimit-remaining")?.max(0)).ok()?;
    let limit = number("x-ratelimit-limit").and_then(|l| u32::try_from(l).ok());
    let reset_at = number("x-ratelimit-reset").and_then(|r| {
        if r > 1_000_000_000 {
            DateTime::from_timestamp(r, 0)
        } else if r >= 0 {
            Some(now + chrono::Duration::seconds(r))
        } else {
            None
        }
    });

    Some(VendorQuota {
        limit,
        remaining,
        reset_at,
    })
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;

    /// Get vendor quota numbers from rate-limit headers.
    fn vendor_quota(&self) -> Option<VendorQuota>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS
    }

    fn retry_after_secs(&self) -> Option<u64> {
        retry_after_from_headers(self.headers())
    }

    fn vendor_quota(&self) -> Option<VendorQuota> {
        quota_from_headers(self.headers(), Utc::now())
    }
}

// ============================================================================
// Tests
// ============================================================================
