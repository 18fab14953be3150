//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use shelfscan_core::{
    BudgetEntry, LookupResponse, OperationKind, ResolutionAttempt, ResolutionResult,
};
use shelfscan_fetch::SourceInfo;

// ============================================================================
// Output Types
// ============================================================================

/// A resolution: the route-style response plus what each source did.
#[derive(Debug, Serialize)]
pub struct ResolutionOutput {
    #[serde(flatten)]
    pub response: LookupResponse,
    pub attempts: Vec<ResolutionAttempt>,
}

/// Source listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutput {
    pub id: String,
    pub display_name: String,
    pub priority: u32,
    pub configured: bool,
    pub kinds: Vec<OperationKind>,
    pub min_spacing_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_remaining: Option<u32>,
}

impl From<&SourceInfo> for SourceOutput {
    fn from(info: &SourceInfo) -> Self {
        Self {
            id: info.id.clone(),
            display_name: info.name.clone(),
            priority: info.priority,
            configured: info.configured,
            kinds: info.kinds.clone(),
            min_spacing_ms: info.min_spacing_ms,
            lookup_remaining: info.lookup_budget.as_ref().map(|b| b.remaining),
            search_remaining: info.search_budget.as_ref().map(|b| b.remaining),
        }
    }
}

/// One budget row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOutput {
    pub source: String,
    pub kind: OperationKind,
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    #[serde(serialize_with = "serialize_datetime")]
    pub resets_at: DateTime<Utc>,
}

impl From<&BudgetEntry> for BudgetOutput {
    fn from(entry: &BudgetEntry) -> Self {
        Self {
            source: entry.source.clone(),
            kind: entry.kind,
            limit: entry.budget.limit,
            used: entry.budget.used,
            remaining: entry.budget.remaining,
            resets_at: entry.budget.window_reset_at,
        }
    }
}

/// One reset budget.
#[derive(Debug, Serialize)]
pub struct ResetOutput<'a> {
    pub source: &'a str,
    pub kind: OperationKind,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a resolution.
    pub fn format_resolution(&self, result: ResolutionResult) -> Result<String> {
        let attempts = result.attempts.clone();
        self.format(&ResolutionOutput {
            response: LookupResponse::from_result(result),
            attempts,
        })
    }

    /// Formats the source listing.
    pub fn format_sources(&self, infos: &[SourceInfo]) -> Result<String> {
        let outputs: Vec<SourceOutput> = infos.iter().map(SourceOutput::from).collect();
        self.format(&outputs)
    }

    /// Formats budget rows.
    pub fn format_budgets(&self, entries: &[BudgetEntry]) -> Result<String> {
        let outputs: Vec<BudgetOutput> = entries.iter().map(BudgetOutput::from).collect();
        self.format(&outputs)
    }

    /// Formats the list of reset budgets.
    pub fn format_resets(&self, resets: &[(String, OperationKind)]) -> Result<String> {
        let outputs: Vec<ResetOutput<'_>> = resets
            .iter()
            .map(|(source, kind)| ResetOutput {
                source,
                kind: *kind,
            })
            .collect();
        self.format(&outputs)
    }
}
