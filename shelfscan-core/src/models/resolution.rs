//! Resolution results.
//!
//! A [`ResolutionResult`] is created fresh for every resolution call. It
//! carries the product (if any), the source that produced it, the budget
//! snapshot of every source considered, and one [`ResolutionAttempt`] per
//! source in the order they were considered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::budget::RateBudget;
use super::lookup::OperationKind;
use super::product::NormalizedProduct;

// ============================================================================
// Attempt Outcome
// ============================================================================

/// What happened when the resolver considered one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The source produced a product.
    Success,
    /// Not configured; never called.
    SkippedUnconfigured,
    /// Budget exhausted; never called.
    SkippedExhausted,
    /// Source does not implement this operation kind; never called.
    SkippedUnsupported,
    /// Source reported a missing credential at call time.
    Unconfigured,
    /// Vendor answered 429.
    RateLimited,
    /// Vendor answered with zero matches.
    NotFound,
    /// Network error, timeout, or unexpected status.
    TransportFailure,
}

impl AttemptOutcome {
    /// Returns true if the source was actually called.
    pub const fn was_called(self) -> bool {
        !matches!(
            self,
            Self::SkippedUnconfigured | Self::SkippedExhausted | Self::SkippedUnsupported
        )
    }

    /// Returns true for failures that may clear up on a later call.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::RateLimited | Self::TransportFailure)
    }

    /// Returns the wire name of this outcome.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SkippedUnconfigured => "skipped_unconfigured",
            Self::SkippedExhausted => "skipped_exhausted",
            Self::SkippedUnsupported => "skipped_unsupported",
            Self::Unconfigured => "unconfigured",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
            Self::TransportFailure => "transport_failure",
        }
    }
}

/// One source considered during a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionAttempt {
    /// Source identifier.
    pub source: String,
    /// Outcome.
    pub outcome: AttemptOutcome,
    /// Error message for failed calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Vendor retry hint, for rate-limited calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    /// Wall time spent on this source, pacing included.
    #[serde(default)]
    pub duration_ms: u64,
}

impl ResolutionAttempt {
    /// Creates an attempt record for a source that was never called.
    pub fn skipped(source: impl Into<String>, outcome: AttemptOutcome) -> Self {
        Self {
            source: source.into(),
            outcome,
            error: None,
            retry_after_secs: None,
            duration_ms: 0,
        }
    }
}

// ============================================================================
// Resolution Result
// ============================================================================

/// Outcome of one resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// Whether any source produced a product.
    pub found: bool,
    /// The source that produced the product.
    pub source: Option<String>,
    /// The normalized product.
    pub product: Option<NormalizedProduct>,
    /// Operation kind the key required.
    pub kind: OperationKind,
    /// Budget of every source considered, for `kind`.
    pub usage_snapshot: BTreeMap<String, RateBudget>,
    /// Sources considered, in order.
    #[serde(default)]
    pub attempts: Vec<ResolutionAttempt>,
}

impl ResolutionResult {
    /// Creates a "nothing found" result.
    pub fn not_found(kind: OperationKind) -> Self {
        Self {
            found: false,
            source: None,
            product: None,
            kind,
            usage_snapshot: BTreeMap::new(),
            attempts: Vec::new(),
        }
    }

    /// Creates a result for a product produced by `source`.
    pub fn found(kind: OperationKind, source: impl Into<String>, product: NormalizedProduct) -> Self {
        Self {
            found: true,
            source: Some(source.into()),
            product: Some(product),
            kind,
            usage_snapshot: BTreeMap::new(),
            attempts: Vec::new(),
        }
    }

    /// Returns true if any source failed in a way that may clear up later.
    ///
    /// Lets callers tell "nothing found anywhere" apart from "try again".
    pub fn had_transient_failure(&self) -> bool {
        self.attempts.iter().any(|a| a.outcome.is_transient())
    }

    /// Returns the sources that were actually called, in order.
    pub fn called_sources(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.outcome.was_called())
            .map(|a| a.source.as_str())
            .collect()
    }

    /// Returns the largest retry hint reported by any source.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.attempts.iter().filter_map(|a| a.retry_after_secs).max()
    }
}

// ============================================================================
// Route Mapping
// ============================================================================

/// Body of a lookup response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupBody {
    /// Whether a product was found.
    pub found: bool,
    /// Producing source.
    pub source: Option<String>,
    /// Normalized product.
    pub product: Option<NormalizedProduct>,
    /// Usage snapshot as auxiliary metadata.
    pub usage: BTreeMap<String, RateBudget>,
    /// True when the miss may be temporary.
    #[serde(default)]
    pub retryable: bool,
}

/// Framework-agnostic route response for a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// HTTP-style status: 200 when found, 404 otherwise.
    pub status: u16,
    /// Response body.
    pub body: LookupBody,
}

impl LookupResponse {
    /// Maps a resolution result to a response.
    pub fn from_result(result: ResolutionResult) -> Self {
        let status = if result.found { 200 } else { 404 };
        let retryable = !result.found && result.had_transient_failure();
        Self {
            status,
            body: LookupBody {
                found: result.found,
                source: result.source,
                product: result.product,
                usage: result.usage_snapshot,
                retryable,
            },
        }
    }
}

impl From<ResolutionResult> for LookupResponse {
    fn from(result: ResolutionResult) -> Self {
        Self::from_result(result)
    }
}
