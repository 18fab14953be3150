//! UPCitemdb product source.

use std::time::Duration;

use async_trait::async_trait;
use shelfscan_core::OperationKind;
use shelfscan_fetch::{BudgetLimits, FetchContext, LookupError, ProductSource, SourceResponse};
use tracing::{debug, instrument};

use super::api::{self, Plan};
use super::{DISPLAY_NAME, ID, default_tuning};
use crate::descriptor::{SourceSetup, SourceTuning};
use crate::reply::VendorReply;

/// Variables the user key is read from, in order.
pub const KEY_ENVS: &[&str] = &["SHELFSCAN_UPCITEMDB_KEY", "UPCITEMDB_USER_KEY"];

/// UPC lookup and name search against UPCitemdb.
///
/// Works without a key through the trial endpoint, so it always reports
/// itself configured.
#[derive(Clone)]
pub struct UpcItemDbSource {
    user_key: Option<String>,
    tuning: SourceTuning,
}

impl UpcItemDbSource {
    /// Creates a source. `None` selects the trial endpoint.
    pub fn new(user_key: Option<String>, tuning: SourceTuning) -> Self {
        Self { user_key, tuning }
    }

    /// Creates a trial source with default tuning.
    pub fn trial() -> Self {
        Self::new(None, default_tuning())
    }

    /// Builds the source from a descriptor setup.
    pub fn from_setup(setup: &SourceSetup<'_>) -> Self {
        Self::new(setup.credential(KEY_ENVS), setup.tuning)
    }

    /// Returns the endpoint family in use.
    pub fn plan(&self) -> Plan {
        if self.user_key.is_some() {
            Plan::Paid
        } else {
            Plan::Trial
        }
    }

    async fn fetch(&self, ctx: &FetchContext, url: url::Url) -> Result<SourceResponse, LookupError> {
        let headers = api::request_headers(self.user_key.as_deref())?;
        let response = ctx.http.get_with_headers(url.as_str(), headers).await?;
        let reply = VendorReply::read(response).await?;
        api::interpret(&reply)
    }
}

impl std::fmt::Debug for UpcItemDbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpcItemDbSource")
            .field("plan", &self.plan())
            .field("tuning", &self.tuning)
            .finish()
    }
}

#[async_trait]
impl ProductSource for UpcItemDbSource {
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
        true
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
        debug!(plan = ?self.plan(), "UPCitemdb lookup");
        let url = api::lookup_url(self.plan(), code)?;
        self.fetch(ctx, url).await
    }

    #[instrument(skip(self, ctx))]
    async fn search_by_name(
        &self,
        ctx: &FetchContext,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SourceResponse, LookupError> {
        debug!(plan = ?self.plan(), "UPCitemdb search");
        let url = api::search_url(self.plan(), name, brand)?;
        self.fetch(ctx, url).await
    }
}
