//! Rate budget counters.
//!
//! A [`RateBudget`] is the per-source, per-operation-kind counter kept by the
//! budget tracker. Outside of a reset `used + remaining == limit` holds, and
//! `remaining` never drops below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lookup::OperationKind;
use crate::error::CoreError;

/// Call budget for one source and one operation kind within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBudget {
    /// Calls allowed per window.
    pub limit: u32,
    /// Calls made in the current window.
    pub used: u32,
    /// Calls left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub window_reset_at: DateTime<Utc>,
}

impl RateBudget {
    /// Creates a full budget whose window ends at `window_reset_at`.
    pub fn new(limit: u32, window_reset_at: DateTime<Utc>) -> Self {
        Self {
            limit,
            used: 0,
            remaining: limit,
            window_reset_at,
        }
    }

    /// Records one call. `remaining` clamps at zero.
    pub fn consume(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.used = self.limit - self.remaining;
        } else {
            self.used = self.limit;
        }
    }

    /// Restores the full budget and moves the window end forward.
    pub fn reset(&mut self, next_reset_at: DateTime<Utc>) {
        self.used = 0;
        self.remaining = self.limit;
        self.window_reset_at = next_reset_at;
    }

    /// Adopts vendor-reported quota numbers.
    ///
    /// The vendor's `remaining` always wins. A reported `limit` replaces the
    /// local one, and a reported window end replaces the local one.
    pub fn apply_vendor_quota(
        &mut self,
        limit: Option<u32>,
        remaining: u32,
        reset_at: Option<DateTime<Utc>>,
    ) {
        if let Some(limit) = limit {
            self.limit = limit;
        }
        self.remaining = remaining.min(self.limit);
        self.used = self.limit - self.remaining;
        if let Some(reset_at) = reset_at {
            self.window_reset_at = reset_at;
        }
    }

    /// Returns true if no calls are left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns true if the window ended at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_reset_at
    }

    /// Returns the used share of the limit as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> f64 {
        if self.limit == 0 {
            return 100.0;
        }
        f64::from(self.used) / f64::from(self.limit) * 100.0
    }

    /// Validates the counter invariant.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if `used + remaining != limit`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.used.checked_add(self.remaining) != Some(self.limit) {
            return Err(CoreError::InvalidData(format!(
                "budget counters out of balance: used {} + remaining {} != limit {}",
                self.used, self.remaining, self.limit
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// One persisted budget counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// Source identifier.
    pub source: String,
    /// Operation kind.
    pub kind: OperationKind,
    /// Counter state.
    pub budget: RateBudget,
}

/// Exported tracker state, for persistence across processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// All counters.
    #[serde(default)]
    pub entries: Vec<BudgetEntry>,
}

impl BudgetSnapshot {
    /// Creates an empty snapshot taken at `saved_at`.
    pub fn new(saved_at: DateTime<Utc>) -> Self {
        Self {
            saved_at,
            entries: Vec::new(),
        }
    }

    /// Returns the entry for a source and kind.
    pub fn get(&self, source: &str, kind: OperationKind) -> Option<&RateBudget> {
        self.entries
            .iter()
            .find(|e| e.source == source && e.kind == kind)
            .map(|e| &e.budget)
    }
}

impl Default for BudgetSnapshot {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_consume_clamps_at_zero() {
        let mut budget = RateBudget::new(2, Utc::now() + Duration::hours(24));
        budget.consume();
        budget.consume();
        budget.consume();
        assert_eq!(budget.used, 2);
        assert_eq!(budget.remaining, 0);
        assert!(budget.is_exhausted());
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn test_reset_restores_limit() {
        let start = Utc::now();
        let mut budget = RateBudget::new(5, start);
        budget.consume();
        budget.reset(start + Duration::hours(24));
        assert_eq!(budget.used, 0);
        assert_eq!(budget.remaining, 5);
        assert_eq!(budget.window_reset_at, start + Duration::hours(24));
    }

    #[test]
    fn test_vendor_quota_overrides_local_counts() {
        let mut budget = RateBudget::new(100, Utc::now());
        budget.consume();
        budget.apply_vendor_quota(None, 0, None);
        assert_eq!(budget.remaining, 0);
        assert_eq!(budget.used, 100);

        budget.apply_vendor_quota(Some(50), 40, None);
        assert_eq!(budget.limit, 50);
        assert_eq!(budget.remaining, 40);
        assert_eq!(budget.used, 10);
    }

    #[test]
    fn test_vendor_remaining_above_limit_is_capped() {
        let mut budget = RateBudget::new(10, Utc::now());
        budget.apply_vendor_quota(None, 25, None);
        assert_eq!(budget.remaining, 10);
        assert_eq!(budget.used, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let budget = RateBudget::new(20, Utc::now());
        let json = serde_json::to_value(&budget).unwrap();
        assert!(json.get("windowResetAt").is_some());
        assert_eq!(json["remaining"], 20);
    }
}
