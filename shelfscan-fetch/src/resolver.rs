//! Priority waterfall over source adapters.
//!
//! The resolver turns one [`LookupKey`] into one [`ResolutionResult`]. It
//! tries configured sources one at a time in ascending priority, skips any
//! whose budget for the key's operation kind is spent, and stops at the
//! first success. Every failure is logged and recorded; none is fatal.

use std::sync::Arc;
use std::time::Instant;

use shelfscan_core::{
    AttemptOutcome, LookupKey, OperationKind, ResolutionAttempt, ResolutionResult,
};
use tracing::{debug, info, instrument, warn};

use crate::budget::RateBudgetTracker;
use crate::context::FetchContext;
use crate::source::{ProductSource, SourceAdapter, SourceInfo};

// ============================================================================
// Resolver
// ============================================================================

/// Ordered set of source adapters sharing one budget tracker.
pub struct Resolver {
    adapters: Vec<SourceAdapter>,
    tracker: Arc<RateBudgetTracker>,
    ctx: FetchContext,
}

impl Resolver {
    /// Creates an empty resolver.
    pub fn new(ctx: FetchContext, tracker: Arc<RateBudgetTracker>) -> Self {
        Self {
            adapters: Vec::new(),
            tracker,
            ctx,
        }
    }

    /// Adds a source and returns the resolver.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ProductSource>) -> Self {
        self.add_source(source);
        self
    }

    /// Adds a source. Its limits are registered with the tracker.
    pub fn add_source(&mut self, source: Arc<dyn ProductSource>) {
        self.adapters
            .push(SourceAdapter::new(source, self.tracker.clone()));
        self.sort_by_priority();
    }

    /// Sorts adapters by priority (lowest first). Ties keep insertion order.
    fn sort_by_priority(&mut self) {
        self.adapters.sort_by_key(SourceAdapter::priority);
    }

    /// Returns the adapters in resolution order.
    pub fn adapters(&self) -> &[SourceAdapter] {
        &self.adapters
    }

    /// Returns the adapter with the given ID.
    pub fn adapter(&self, id: &str) -> Option<&SourceAdapter> {
        self.adapters.iter().find(|a| a.id() == id)
    }

    /// Returns the shared budget tracker.
    pub fn tracker(&self) -> &Arc<RateBudgetTracker> {
        &self.tracker
    }

    /// Returns the fetch context.
    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    /// Returns the number of adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Returns information about all sources, in resolution order.
    pub fn source_info(&self) -> Vec<SourceInfo> {
        self.adapters.iter().map(SourceAdapter::info).collect()
    }

    /// Resolves a key to a product.
    ///
    /// Never fails: "nothing found" is a normal result. The usage snapshot
    /// covers every configured source the context admits, whether or not it
    /// was called.
    #[instrument(skip(self, key), fields(key = %key, kind = %key.kind()))]
    pub async fn resolve(&self, key: &LookupKey) -> ResolutionResult {
        let start = Instant::now();
        let kind = key.kind();
        let mut attempts = Vec::new();

        if let LookupKey::Code { code } = key {
            if !key.has_valid_check_digit() {
                warn!(code = %code, "Code fails its check digit, trying anyway");
            }
        }

        let candidates: Vec<&SourceAdapter> = self
            .adapters
            .iter()
            .filter(|a| self.ctx.allows_source(a.id()))
            .filter(|adapter| {
                if adapter.is_configured() {
                    true
                } else {
                    debug!(source = %adapter.id(), "Source not configured, skipping");
                    attempts.push(ResolutionAttempt::skipped(
                        adapter.id(),
                        AttemptOutcome::SkippedUnconfigured,
                    ));
                    false
                }
            })
            .collect();

        let mut found = None;
        for adapter in &candidates {
            if let Some(outcome) = self.pre_flight(adapter, kind) {
                attempts.push(ResolutionAttempt::skipped(adapter.id(), outcome));
                continue;
            }

            let attempt_start = Instant::now();
            debug!(source = %adapter.id(), "Calling source");
            let result = adapter.call(&self.ctx, key).await;
            let duration_ms = elapsed_ms(attempt_start);

            match result {
                Ok(response) => {
                    let product = response.payload.normalize();
                    info!(source = %adapter.id(), duration_ms, "Source produced a product");
                    attempts.push(ResolutionAttempt {
                        source: adapter.id().to_string(),
                        outcome: AttemptOutcome::Success,
                        error: None,
                        retry_after_secs: None,
                        duration_ms,
                    });
                    found = Some((adapter.id().to_string(), product));
                    break;
                }
                Err(error) => {
                    warn!(
                        source = %adapter.id(),
                        error = %error,
                        duration_ms,
                        "Source failed, trying next"
                    );
                    attempts.push(ResolutionAttempt {
                        source: adapter.id().to_string(),
                        outcome: error.outcome(),
                        error: Some(error.to_string()),
                        retry_after_secs: error.retry_after(),
                        duration_ms,
                    });
                }
            }
        }

        let mut result = match found {
            Some((source, product)) => ResolutionResult::found(kind, source, product),
            None => ResolutionResult::not_found(kind),
        };
        result.usage_snapshot = self
            .tracker
            .usage_snapshot(candidates.iter().map(|a| a.id()), kind);
        result.attempts = attempts;

        if result.found {
            info!(
                source = result.source.as_deref().unwrap_or_default(),
                duration_ms = elapsed_ms(start),
                "Resolved"
            );
        } else {
            info!(
                tried = result.called_sources().len(),
                transient = result.had_transient_failure(),
                duration_ms = elapsed_ms(start),
                "No source produced a product"
            );
        }
        result
    }

    /// Decides whether a configured source must be skipped without a call.
    fn pre_flight(&self, adapter: &SourceAdapter, kind: OperationKind) -> Option<AttemptOutcome> {
        if !adapter.supports(kind) {
            debug!(source = %adapter.id(), %kind, "Source does not support kind, skipping");
            return Some(AttemptOutcome::SkippedUnsupported);
        }
        if self.tracker.check_remaining(adapter.id(), kind) == 0 {
            debug!(source = %adapter.id(), %kind, "Budget exhausted, skipping");
            return Some(AttemptOutcome::SkippedExhausted);
        }
        None
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("adapters", &self.adapters)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
