//! Source adapter contract and bookkeeping.
//!
//! A [`ProductSource`] performs exactly one vendor call and hands back the
//! raw payload. The [`SourceAdapter`] wrapping it owns everything around the
//! call that every vendor shares: the configuration pre-flight, pacing,
//! the per-call deadline, budget consumption, and adopting vendor quota
//! headers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelfscan_core::{LookupKey, Normalize, OperationKind, RateBudget};
use tracing::{debug, instrument};

use crate::budget::{BudgetLimits, RateBudgetTracker, VendorQuota};
use crate::context::FetchContext;
use crate::error::LookupError;
use crate::pacing::Pacer;

// ============================================================================
// Source Response
// ============================================================================

/// A successful vendor answer: the raw payload plus any quota headers.
pub struct SourceResponse {
    /// Vendor payload, not yet normalized.
    pub payload: Box<dyn Normalize + Send + Sync>,
    /// Quota numbers the vendor reported alongside the payload.
    pub quota: Option<VendorQuota>,
}

impl SourceResponse {
    /// Creates a response without quota headers.
    pub fn new(payload: impl Normalize + Send + Sync + 'static) -> Self {
        Self {
            payload: Box::new(payload),
            quota: None,
        }
    }

    /// Attaches vendor quota numbers.
    pub fn with_quota(mut self, quota: Option<VendorQuota>) -> Self {
        self.quota = quota;
        self
    }
}

impl fmt::Debug for SourceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceResponse")
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Product Source Trait
// ============================================================================

/// One external product-data service.
///
/// ## Implementing a Source
///
/// ```ignore
/// struct MySource { key: Option<String> }
///
/// #[async_trait]
/// impl ProductSource for MySource {
///     fn id(&self) -> &str { "mysource" }
///     fn priority(&self) -> u32 { 4 }
///     fn min_spacing(&self) -> Duration { Duration::from_secs(1) }
///     fn limits(&self) -> BudgetLimits { BudgetLimits::new(100, 0) }
///     fn is_configured(&self) -> bool { self.key.is_some() }
///
///     async fn lookup_by_code(
///         &self,
///         ctx: &FetchContext,
///         code: &str,
///     ) -> Result<SourceResponse, LookupError> {
///         // Call the vendor and wrap its payload
///     }
/// }
/// ```
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Stable identifier (e.g., "upcitemdb").
    fn id(&self) -> &str;

    /// Human-readable name.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Resolution order; lower is tried first.
    fn priority(&self) -> u32;

    /// Minimum gap between two outbound calls from this source.
    fn min_spacing(&self) -> Duration;

    /// Calls allowed per budget window.
    fn limits(&self) -> BudgetLimits;

    /// Returns true if the credentials this source needs are present.
    ///
    /// Must not touch the network and must not fail.
    fn is_configured(&self) -> bool;

    /// Returns true if this source implements the operation kind.
    fn supports(&self, kind: OperationKind) -> bool {
        kind == OperationKind::Lookup
    }

    /// Looks up a product by UPC/EAN/GTIN.
    async fn lookup_by_code(
        &self,
        ctx: &FetchContext,
        code: &str,
    ) -> Result<SourceResponse, LookupError>;

    /// Searches products by name and optional brand.
    async fn search_by_name(
        &self,
        _ctx: &FetchContext,
        _name: &str,
        _brand: Option<&str>,
    ) -> Result<SourceResponse, LookupError> {
        Err(LookupError::Unsupported(OperationKind::Search))
    }
}

// ============================================================================
// Source Info
// ============================================================================

/// Information about a source (for reporting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Priority.
    pub priority: u32,
    /// Whether credentials are present.
    pub configured: bool,
    /// Supported operation kinds.
    pub kinds: Vec<OperationKind>,
    /// Minimum spacing in milliseconds.
    pub min_spacing_ms: u64,
    /// Current lookup budget.
    pub lookup_budget: Option<RateBudget>,
    /// Current search budget.
    pub search_budget: Option<RateBudget>,
}

// ============================================================================
// Source Adapter
// ============================================================================

/// A source with its pacing gate and a handle on the shared budget tracker.
pub struct SourceAdapter {
    source: Arc<dyn ProductSource>,
    tracker: Arc<RateBudgetTracker>,
    pacer: Pacer,
}

impl SourceAdapter {
    /// Wraps a source and registers its limits with the tracker.
    pub fn new(source: Arc<dyn ProductSource>, tracker: Arc<RateBudgetTracker>) -> Self {
        tracker.register(source.id(), source.limits());
        let pacer = Pacer::new(source.min_spacing());
        Self {
            source,
            tracker,
            pacer,
        }
    }

    /// Returns the source ID.
    pub fn id(&self) -> &str {
        self.source.id()
    }

    /// Returns the source priority.
    pub fn priority(&self) -> u32 {
        self.source.priority()
    }

    /// Returns true if the source is configured.
    pub fn is_configured(&self) -> bool {
        self.source.is_configured()
    }

    /// Returns true if the source implements the operation kind.
    pub fn supports(&self, kind: OperationKind) -> bool {
        self.source.supports(kind)
    }

    /// Returns the pacing gate.
    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Returns a report line for this source.
    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            id: self.id().to_string(),
            name: self.source.display_name().to_string(),
            priority: self.priority(),
            configured: self.is_configured(),
            kinds: OperationKind::ALL
                .into_iter()
                .filter(|k| self.supports(*k))
                .collect(),
            min_spacing_ms: u64::try_from(self.pacer.min_spacing().as_millis())
                .unwrap_or(u64::MAX),
            lookup_budget: self.tracker.budget(self.id(), OperationKind::Lookup),
            search_budget: self.tracker.budget(self.id(), OperationKind::Search),
        }
    }

    /// Looks up a product by code.
    pub async fn lookup_by_code(
        &self,
        ctx: &FetchContext,
        code: &str,
    ) -> Result<SourceResponse, LookupError> {
        let key = LookupKey::Code {
            code: code.to_string(),
        };
        self.call(ctx, &key).await
    }

    /// Searches products by name.
    pub async fn search_by_name(
        &self,
        ctx: &FetchContext,
        name: &str,
        brand: Option<&str>,
    ) -> Result<SourceResponse, LookupError> {
        let key = LookupKey::Name {
            name: name.to_string(),
            brand: brand.map(ToString::to_string),
        };
        self.call(ctx, &key).await
    }

    /// Performs one vendor call for `key` with full bookkeeping.
    ///
    /// Unconfigured and unsupported calls are refused before any I/O and
    /// consume nothing. Every call that reaches the vendor consumes one unit
    /// of budget, whatever its outcome. Vendor quota numbers, when present,
    /// then override the local count.
    #[instrument(skip(self, ctx, key), fields(source = %self.id(), kind = %key.kind()))]
    pub async fn call(
        &self,
        ctx: &FetchContext,
        key: &LookupKey,
    ) -> Result<SourceResponse, LookupError> {
        let kind = key.kind();
        if !self.source.is_configured() {
            return Err(LookupError::Unconfigured(self.id().to_string()));
        }
        if !self.source.supports(kind) {
            return Err(LookupError::Unsupported(kind));
        }

        self.pacer.wait().await;

        let timeout = ctx.timeout();
        let call = async {
            match key {
                LookupKey::Code { code } => self.source.lookup_by_code(ctx, code).await,
                LookupKey::Name { name, brand } => {
                    self.source.search_by_name(ctx, name, brand.as_deref()).await
                }
            }
        };
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::timeout(timeout)),
        };

        self.pacer.mark();
        let budget = self.tracker.consume(self.id(), kind);

        let quota = match &result {
            Ok(response) => response.quota.as_ref(),
            Err(err) => err.quota(),
        };
        if let Some(quota) = quota {
            self.tracker.apply_vendor_quota(self.id(), kind, quota);
        }

        debug!(
            ok = result.is_ok(),
            remaining = budget.remaining,
            vendor_quota = quota.is_some(),
            "Source call finished"
        );
        result
    }
}

impl fmt::Debug for SourceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("id", &self.id())
            .field("priority", &self.priority())
            .field("pacer", &self.pacer)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::ResetPolicy;
    use shelfscan_core::NormalizedProduct;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        configured: bool,
        calls: AtomicUsize,
        answer: fn() -> Result<SourceResponse, LookupError>,
    }

    impl CountingSource {
        fn new(configured: bool, answer: fn() -> Result<SourceResponse, LookupError>) -> Self {
            Self {
                configured,
                calls: AtomicUsize::new(0),
                answer,
            }
        }
    }

    #[async_trait]
    impl ProductSource for CountingSource {
        fn id(&self) -> &str {
            "counting"
        }

        fn priority(&self) -> u32 {
            1
        }

        fn min_spacing(&self) -> Duration {
            Duration::from_millis(500)
        }

        fn limits(&self) -> BudgetLimits {
            BudgetLimits::new(10, 5)
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn lookup_by_code(
            &self,
            _ctx: &FetchContext,
            _code: &str,
        ) -> Result<SourceResponse, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn found() -> Result<SourceResponse, LookupError> {
        Ok(SourceResponse::new(NormalizedProduct::new()))
    }

    fn transport() -> Result<SourceResponse, LookupError> {
        Err(LookupError::Transport("connection reset".to_string()))
    }

    fn adapter(source: Arc<CountingSource>) -> (SourceAdapter, Arc<RateBudgetTracker>) {
        let tracker = Arc::new(RateBudgetTracker::new(ResetPolicy::daily()));
        (SourceAdapter::new(source, tracker.clone()), tracker)
    }

    #[tokio::test]
    async fn test_unconfigured_refused_without_consuming() {
        let source = Arc::new(CountingSource::new(false, found));
        let (adapter, tracker) = adapter(source.clone());
        let ctx = FetchContext::new();

        let err = adapter.lookup_by_code(&ctx, "000000000000").await.unwrap_err();
        assert!(matches!(err, LookupError::Unconfigured(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.check_remaining("counting", OperationKind::Lookup), 10);
    }

    #[tokio::test]
    async fn test_unsupported_refused_without_consuming() {
        let source = Arc::new(CountingSource::new(true, found));
        let (adapter, tracker) = adapter(source.clone());
        let ctx = FetchContext::new();

        let err = adapter
            .search_by_name(&ctx, "mug", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Unsupported(OperationKind::Search)));
        assert_eq!(tracker.check_remaining("counting", OperationKind::Search), 5);
    }

    #[tokio::test]
    async fn test_failed_call_still_consumes() {
        let source = Arc::new(CountingSource::new(true, transport));
        let (adapter, tracker) = adapter(source.clone());
        let ctx = FetchContext::new();

        assert!(adapter.lookup_by_code(&ctx, "000000000000").await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.check_remaining("counting", OperationKind::Lookup), 9);
        assert!(adapter.pacer().last_call_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_is_paced() {
        let source = Arc::new(CountingSource::new(true, found));
        let (adapter, _) = adapter(source);
        let ctx = FetchContext::new();

        adapter.lookup_by_code(&ctx, "000000000000").await.unwrap();
        let start = tokio::time::Instant::now();
        adapter.lookup_by_code(&ctx, "000000000000").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn test_info_reports_kinds_and_budgets() {
        let source = Arc::new(CountingSource::new(true, found));
        let (adapter, _) = adapter(source);
        let info = adapter.info();
        assert_eq!(info.kinds, vec![OperationKind::Lookup]);
        assert_eq!(info.min_spacing_ms, 500);
        assert_eq!(info.lookup_budget.map(|b| b.limit), Some(10));
    }
}
