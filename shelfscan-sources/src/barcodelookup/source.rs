//! Barcode Lookup product source.

use std::time::Duration;

use async_trait::async_trait;
use shelfscan_core::OperationKind;
use shelfscan_fetch::{BudgetLimits, FetchContext, LookupError, ProductSource, SourceResponse};
use tracing::instrument;

use super::api::{self, Query};
use super::{DISPLAY_NAME, ID};
use crate::descriptor::{SourceSetup, SourceTuning};
use crate::reply::VendorReply;

/// Variables the API key is read from, in order.
pub const KEY_ENVS: &[&str] = &["SHELFSCAN_BARCODELOOKUP_KEY", "BARCODELOOKUP_API_KEY"];

/// Barcode and name lookups against Barcode Lookup. Requires an API key.
#[derive(Clone)]
pub struct BarcodeLookupSource {
    api_key: Option<String>,
    tuning: SourceTuning,
}

impl BarcodeLookupSource {
    /// Creates a source.
    pub fn new(api_key: Option<String>, tuning: SourceTuning) -> Self {
        Self { api_key, tuning }
    }

    /// Builds the source from a descriptor setup.
    pub fn from_setup(setup: &SourceSetup<'_>) -> Self {
        Self::new(setup.credential(KEY_ENVS), setup.tuning)
    }

    async fn fetch(&self, ctx: &FetchContext, query: Query<'_>) -> Result<SourceResponse, LookupError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LookupError::Unconfigured(ID.to_string()))?;
        let url = api::products_url(query, key)?;
        let response = ctx.http.get(url.as_str()).await?;
        let reply = VendorReply::read(response).await?;
        api::interpret(&reply)
    }
}

impl std::fmt::Debug for BarcodeLookupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeLookupSource")
            .field("configured", &self.api_key.is_some())
            .field("tuning", &self.tuning)
            .finish()
    }
}

#[async_trait]
impl ProductSource for BarcodeLookupSource {
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
        self.api_key.is_some()
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
        self.fetch(ctx, Query::Barcode(code)).await
    }

    #[instrument(skip(self, ctx))]
    async fn search_by_name(
        &self,
        ctx: &FetchContext,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SourceResponse, LookupError> {
        self.fetch(ctx, Query::Search { name, brand }).await
    }
}
