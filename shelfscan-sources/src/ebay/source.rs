//! eBay product source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use shelfscan_core::OperationKind;
use shelfscan_fetch::{
    BudgetLimits, CredentialSource, FetchContext, LookupError, ProductSource, SourceResponse,
};
use tracing::{instrument, warn};

use super::api::{self, Query};
use super::token::{EbayCredential, TokenCache};
use super::{DISPLAY_NAME, ID};
use crate::descriptor::{SourceSetup, SourceTuning};
use crate::reply::VendorReply;

/// Variables a ready-made OAuth token is read from, in order.
pub const TOKEN_ENVS: &[&str] = &["SHELFSCAN_EBAY_TOKEN", "EBAY_OAUTH_TOKEN"];

/// Variable holding the application (client) id.
pub const CLIENT_ID_ENV: &str = "SHELFSCAN_EBAY_CLIENT_ID";

/// Variable holding the application (client) secret.
pub const CLIENT_SECRET_ENV: &str = "SHELFSCAN_EBAY_CLIENT_SECRET";

/// Marketplace search by GTIN and by keywords.
#[derive(Debug)]
pub struct EbaySource {
    tokens: TokenCache,
    tuning: SourceTuning,
}

impl EbaySource {
    /// Creates a source.
    pub fn new(credential: Option<EbayCredential>, tuning: SourceTuning) -> Self {
        Self {
            tokens: TokenCache::new(credential),
            tuning,
        }
    }

    /// Builds the source from a descriptor setup.
    ///
    /// A token wins over client keys. Client keys count only when both
    /// halves are present.
    pub fn from_setup(setup: &SourceSetup<'_>) -> Self {
        Self::new(read_credential(setup), setup.tuning)
    }

    /// Returns the token cache.
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    async fn fetch(&self, ctx: &FetchContext, query: Query<'_>) -> Result<SourceResponse, LookupError> {
        let token = self.tokens.token(ctx).await?;
        let headers = api::request_headers(&token)?;
        let url = api::search_url(query)?;
        let response = ctx.http.get_with_headers(url.as_str(), headers).await?;
        let reply = VendorReply::read(response).await?;
        if reply.status == StatusCode::UNAUTHORIZED {
            warn!("eBay rejected the token, dropping it");
            self.tokens.invalidate().await;
        }
        api::interpret(&reply, query)
    }
}

fn read_credential(setup: &SourceSetup<'_>) -> Option<EbayCredential> {
    if let Some(token) = setup.credential(TOKEN_ENVS) {
        return Some(EbayCredential::Token(token));
    }
    let creds: &dyn CredentialSource = setup.credentials;
    match (creds.get(CLIENT_ID_ENV), creds.get(CLIENT_SECRET_ENV)) {
        (Some(id), Some(secret)) => Some(EbayCredential::Client { id, secret }),
        _ => None,
    }
}

#[async_trait]
impl ProductSource for EbaySource {
    fn id(&self) -> &str {
        ID
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn priority(&self) -> u32 {
        self.tuning.priority
    }

    fn min_spacing(&self) -> Duration {
        self.tuning.min_spacing
    }

    fn limits(&self) -> BudgetLimits {
        self.tuning.limits
    }

    fn is_configured(&self) -> bool {
        self.tokens.is_configured()
    }

    fn supports(&self, _kind: OperationKind) -> bool {
        true
    }

    #[instrument(skip(self, ctx))]
    async fn lookup_by_code(
        &self,
        ctx: &FetchContext,
        code: &str,
    ) -> Result<SourceResponse, LookupError> {
        self.fetch(ctx, Query::Gtin(code)).await
    }

    #[instrument(skip(self, ctx))]
    async fn search_by_name(
        &self,
        ctx: &FetchContext,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SourceResponse, LookupError> {
        self.fetch(ctx, Query::Keywords { name, brand }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebay::default_tuning;
    use shelfscan_fetch::StaticCredentials;

    fn build(creds: &StaticCredentials) -> EbaySource {
        EbaySource::from_setup(&SourceSetup {
            tuning: default_tuning(),
            credentials: creds,
            key_env: None,
        })
    }

    #[test]
    fn test_unconfigured_without_credentials() {
        assert!(!build(&StaticCredentials::new()).is_configured());
    }

    #[test]
    fn test_client_keys_need_both_halves() {
        let half = StaticCredentials::new().with(CLIENT_ID_ENV, "app");
        assert!(!build(&half).is_configured());

        let both = half.with(CLIENT_SECRET_ENV, "cert");
        assert!(build(&both).is_configured());
    }

    #[test]
    fn test_token_from_fallback_variable() {
        let creds = StaticCredentials::new().with("EBAY_OAUTH_TOKEN", "tok");
        let source = build(&creds);
        assert!(source.is_configured());
        assert_eq!(source.limits(), BudgetLimits::new(5000, 5000));
    }
}
