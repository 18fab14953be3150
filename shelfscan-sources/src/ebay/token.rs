//! eBay application tokens.
//!
//! A static OAuth token is used as-is. With a client id and secret the
//! source runs the `client_credentials` grant and caches the token until
//! shortly before it expires.

use std::time::Duration;

use serde::Deserialize;
use shelfscan_fetch::FetchContext;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::EbayError;
use crate::reply::VendorReply;

/// OAuth token endpoint.
pub const TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";

/// Scope granting public Browse access.
pub const BROWSE_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// How long before expiry a cached token is replaced.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Application token lifetime eBay documents, used when the reply omits it.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(7200);

// ============================================================================
// Credentials
// ============================================================================

/// How the source authenticates.
#[derive(Clone)]
pub enum EbayCredential {
    /// Ready-made OAuth token.
    Token(String),
    /// Application keys exchanged for a token on demand.
    Client {
        /// App ID.
        id: String,
        /// Cert ID.
        secret: String,
    },
}

impl std::fmt::Debug for EbayCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(..)"),
            Self::Client { .. } => f.write_str("Client(..)"),
        }
    }
}

// ============================================================================
// Token Response
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// A token and the moment it should be replaced.
#[derive(Clone)]
pub struct CachedToken {
    /// Bearer token.
    pub value: String,
    /// When to fetch a new one.
    pub refresh_at: Instant,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("refresh_at", &self.refresh_at)
            .finish_non_exhaustive()
    }
}

impl CachedToken {
    /// Returns true while the token can still be used at `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

/// Reads a token-endpoint reply received at `now`.
pub fn parse_token_reply(reply: &VendorReply, now: Instant) -> Result<CachedToken, EbayError> {
    if !reply.status.is_success() {
        let detail: TokenErrorResponse = serde_json::from_str(&reply.body).unwrap_or_default();
        let reason = detail
            .error_description
            .or(detail.error)
            .unwrap_or_else(|| "no detail".to_string());
        return Err(EbayError::TokenExchange(format!(
            "HTTP {}: {reason}",
            reply.status
        )));
    }

    let token: TokenResponse = serde_json::from_str(&reply.body)
        .map_err(|e| EbayError::TokenExchange(format!("unreadable token response: {e}")))?;
    if token.access_token.trim().is_empty() {
        return Err(EbayError::TokenExchange("empty access token".to_string()));
    }

    let lifetime = token
        .expires_in
        .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);
    Ok(CachedToken {
        value: token.access_token,
        refresh_at: now + lifetime.saturating_sub(REFRESH_MARGIN),
    })
}

// ============================================================================
// Token Cache
// ============================================================================

/// Hands out a usable bearer token.
#[derive(Debug)]
pub struct TokenCache {
    credential: Option<EbayCredential>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Creates a cache for `credential`.
    pub fn new(credential: Option<EbayCredential>) -> Self {
        Self {
            credential,
            cached: Mutex::new(None),
        }
    }

    /// Returns true if any credential is present.
    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    /// Returns a token, exchanging client credentials when needed.
    ///
    /// The cache lock is held across the exchange so concurrent callers
    /// share one request.
    pub async fn token(&self, ctx: &FetchContext) -> Result<String, EbayError> {
        let (id, secret) = match &self.credential {
            None => return Err(EbayError::NoCredential),
            Some(EbayCredential::Token(token)) => return Ok(token.clone()),
            Some(EbayCredential::Client { id, secret }) => (id, secret),
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            debug!("Using cached eBay token");
            return Ok(token.value.clone());
        }

        debug!("Exchanging eBay client credentials");
        let form = [("grant_type", "client_credentials"), ("scope", BROWSE_SCOPE)];
        let response = ctx
            .http
            .post_form_basic_auth(TOKEN_URL, id, secret, &form)
            .await
            .map_err(|e| EbayError::TokenExchange(e.to_string()))?;
        let reply = VendorReply::read(response)
            .await
            .map_err(|e| EbayError::TokenExchange(e.to_string()))?;

        let token = parse_token_reply(&reply, Instant::now()).inspect_err(|e| {
            warn!(error = %e, "eBay token exchange failed");
        })?;
        info!("Obtained eBay application token");
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call exchanges again.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    /// Seeds the cache, for callers that already hold a token.
    pub async fn seed(&self, token: CachedToken) {
        *self.cached.lock().await = Some(token);
    }
}
