//! Rate budget tracker.
//!
//! Keeps one [`RateBudget`] per source and operation kind, answers "may this
//! source make one more call of this kind", and records consumption. The
//! tracker is an explicit object handed to the resolver and every adapter,
//! so tests can build isolated instances.
//!
//! Windows roll over lazily: an expired budget reads as full and is reset
//! the next time it is mutated.
//!
//! State is in-memory. [`RateBudgetTracker::snapshot`] and
//! [`RateBudgetTracker::restore`] let a caller persist it across processes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shelfscan_core::{BudgetEntry, BudgetSnapshot, OperationKind, RateBudget};
use tracing::{debug, info, warn};

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Sets the clock.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Reset Policy & Limits
// ============================================================================

/// When budget windows end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Fixed-length windows counted from tracker creation.
    Rolling(Duration),
    /// Windows end at each UTC midnight.
    UtcMidnight,
}

impl ResetPolicy {
    /// Rolling 24-hour windows.
    pub fn daily() -> Self {
        Self::Rolling(Duration::hours(24))
    }

    /// Returns the first window end strictly after `now`.
    ///
    /// Rolling windows are aligned on `anchor`.
    pub fn next_reset(&self, anchor: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::Rolling(window) => {
                Self::rolling_end(window, anchor, now).unwrap_or_else(|| {
                    warn!(?window, "Window out of range, using 24h");
                    Self::rolling_end(Duration::hours(24), anchor, now)
                        .unwrap_or(now + Duration::hours(24))
                })
            }
            Self::UtcMidnight => {
                let today = now.date_naive();
                let next = today.succ_opt().unwrap_or(today);
                next.and_hms_opt(0, 0, 0)
                    .map_or(now + Duration::hours(24), |t| t.and_utc())
            }
        }
    }
}

impl ResetPolicy {
    /// First end of a `window`-long period aligned on `anchor` after `now`.
    /// `None` when the window is not positive or the end is unrepresentable.
    fn rolling_end(
        window: Duration,
        anchor: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if window <= Duration::zero() {
            return None;
        }
        if now < anchor {
            return anchor.checked_add_signed(window);
        }
        let window_ms = window.num_milliseconds();
        let windows = (now - anchor).num_milliseconds() / window_ms + 1;
        let span = Duration::try_milliseconds(window_ms.checked_mul(windows)?)?;
        anchor.checked_add_signed(span)
    }
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self::daily()
    }
}

/// Per-window call limits for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLimits {
    /// Code lookups per window.
    pub lookup: u32,
    /// Name searches per window.
    pub search: u32,
}

impl BudgetLimits {
    /// Creates limits.
    pub const fn new(lookup: u32, search: u32) -> Self {
        Self { lookup, search }
    }

    /// Returns the limit for one kind.
    pub const fn for_kind(&self, kind: OperationKind) -> u32 {
        match kind {
            OperationKind::Lookup => self.lookup,
            OperationKind::Search => self.search,
        }
    }
}

// ============================================================================
// Vendor Quota
// ============================================================================

/// Quota numbers reported by a vendor in response headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorQuota {
    /// Calls allowed per window, if reported.
    pub limit: Option<u32>,
    /// Calls left.
    pub remaining: u32,
    /// Window end, if reported.
    pub reset_at: Option<DateTime<Utc>>,
}

impl VendorQuota {
    /// Creates a quota with only a remaining count.
    pub fn remaining(remaining: u32) -> Self {
        Self {
            limit: None,
            remaining,
            reset_at: None,
        }
    }
}

// ============================================================================
// Tracker
// ============================================================================

type BudgetKey = (String, OperationKind);

/// Per-source, per-kind call budgets.
pub struct RateBudgetTracker {
    clock: Arc<dyn Clock>,
    policy: ResetPolicy,
    anchor: DateTime<Utc>,
    budgets: Mutex<HashMap<BudgetKey, RateBudget>>,
}

impl RateBudgetTracker {
    /// Creates a tracker on the wall clock.
    pub fn new(policy: ResetPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Creates a tracker on a custom clock.
    pub fn with_clock(policy: ResetPolicy, clock: Arc<dyn Clock>) -> Self {
        let anchor = clock.now();
        Self {
            clock,
            policy,
            anchor,
            budgets: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the reset policy.
    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BudgetKey, RateBudget>> {
        self.budgets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reset(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.policy.next_reset(self.anchor, now)
    }

    /// Returns the budget as it reads at `now`: expired windows read as full.
    fn effective(&self, budget: &RateBudget, now: DateTime<Utc>) -> RateBudget {
        if budget.is_expired(now) {
            let mut rolled = budget.clone();
            rolled.reset(self.next_reset(now));
            rolled
        } else {
            budget.clone()
        }
    }

    /// Registers a source with its limits.
    ///
    /// Registering again updates the limits and keeps the calls already
    /// made in the current window.
    pub fn register(&self, source: &str, limits: BudgetLimits) {
        let now = self.clock.now();
        let reset_at = self.next_reset(now);
        let mut budgets = self.lock();
        for kind in OperationKind::ALL {
            let limit = limits.for_kind(kind);
            budgets
                .entry((source.to_string(), kind))
                .and_modify(|b| {
                    let used = b.used.min(limit);
                    b.limit = limit;
                    b.used = used;
                    b.remaining = limit - used;
                })
                .or_insert_with(|| RateBudget::new(limit, reset_at));
        }
        debug!(source, lookup = limits.lookup, search = limits.search, "Registered budget");
    }

    /// Returns true if the source is registered.
    pub fn is_registered(&self, source: &str) -> bool {
        self.lock()
            .contains_key(&(source.to_string(), OperationKind::Lookup))
    }

    /// Returns the calls left for a source and kind. Unregistered sources
    /// have none. Has no side effect.
    pub fn check_remaining(&self, source: &str, kind: OperationKind) -> u32 {
        self.budget(source, kind).map_or(0, |b| b.remaining)
    }

    /// Returns the budget for a source and kind as it reads now.
    pub fn budget(&self, source: &str, kind: OperationKind) -> Option<RateBudget> {
        let now = self.clock.now();
        self.lock()
            .get(&(source.to_string(), kind))
            .map(|b| self.effective(b, now))
    }

    /// Records one call. Never fails: `remaining` clamps at zero.
    ///
    /// Returns the budget after consumption. Consuming for an unregistered
    /// source returns an empty budget and records nothing.
    pub fn consume(&self, source: &str, kind: OperationKind) -> RateBudget {
        let now = self.clock.now();
        let reset_at = self.next_reset(now);
        let mut budgets = self.lock();
        let Some(budget) = budgets.get_mut(&(source.to_string(), kind)) else {
            debug!(source, %kind, "Consume for unregistered source ignored");
            return RateBudget::new(0, reset_at);
        };
        if budget.is_expired(now) {
            budget.reset(reset_at);
        }
        budget.consume();
        debug!(
            source,
            %kind,
            used = budget.used,
            remaining = budget.remaining,
            "Consumed budget"
        );
        budget.clone()
    }

    /// Restores the full budget for a source and kind.
    pub fn reset(&self, source: &str, kind: OperationKind) {
        let now = self.clock.now();
        let reset_at = self.next_reset(now);
        if let Some(budget) = self.lock().get_mut(&(source.to_string(), kind)) {
            budget.reset(reset_at);
            info!(source, %kind, limit = budget.limit, "Budget reset");
        }
    }

    /// Restores every budget.
    pub fn reset_all(&self) {
        let now = self.clock.now();
        let reset_at = self.next_reset(now);
        let mut budgets = self.lock();
        for budget in budgets.values_mut() {
            budget.reset(reset_at);
        }
        info!(count = budgets.len(), "All budgets reset");
    }

    /// Adopts vendor-reported quota numbers for a source and kind.
    pub fn apply_vendor_quota(&self, source: &str, kind: OperationKind, quota: &VendorQuota) {
        let now = self.clock.now();
        let reset_at = self.next_reset(now);
        let mut budgets = self.lock();
        let Some(budget) = budgets.get_mut(&(source.to_string(), kind)) else {
            return;
        };
        if budget.is_expired(now) {
            budget.reset(reset_at);
        }
        let vendor_reset = quota.reset_at.filter(|at| *at > now);
        budget.apply_vendor_quota(quota.limit, quota.remaining, vendor_reset);
        debug!(
            source,
            %kind,
            remaining = budget.remaining,
            limit = budget.limit,
            "Applied vendor quota"
        );
    }

    /// Returns the budgets for `sources` and `kind`, keyed by source.
    pub fn usage_snapshot<'a, I>(&self, sources: I, kind: OperationKind) -> BTreeMap<String, RateBudget>
    where
        I: IntoIterator<Item = &'a str>,
    {
        sources
            .into_iter()
            .filter_map(|id| self.budget(id, kind).map(|b| (id.to_string(), b)))
            .collect()
    }

    /// Exports every budget as it reads now, sorted by source and kind.
    pub fn snapshot(&self) -> BudgetSnapshot {
        let now = self.clock.now();
        let budgets = self.lock();
        let mut entries: Vec<BudgetEntry> = budgets
            .iter()
            .map(|((source, kind), budget)| BudgetEntry {
                source: source.clone(),
                kind: *kind,
                budget: self.effective(budget, now),
            })
            .collect();
        entries.sort_by(|a, b| a.source.cmp(&b.source).then(a.kind.cmp(&b.kind)));
        BudgetSnapshot {
            saved_at: now,
            entries,
        }
    }

    /// Imports persisted budgets.
    ///
    /// Entries whose window has already ended and entries for unregistered
    /// sources are ignored. The locally configured limit is kept; only the
    /// calls made and the window end are taken over. Returns the number of
    /// entries applied.
    pub fn restore(&self, snapshot: &BudgetSnapshot) -> usize {
        let now = self.clock.now();
        let mut budgets = self.lock();
        let mut applied = 0;
        for entry in &snapshot.entries {
            if entry.budget.is_expired(now) {
                continue;
            }
            let Some(budget) = budgets.get_mut(&(entry.source.clone(), entry.kind)) else {
                continue;
            };
            let used = entry.budget.used.min(budget.limit);
            budget.used = used;
            budget.remaining = budget.limit - used;
            budget.window_reset_at = entry.budget.window_reset_at;
            applied += 1;
        }
        debug!(applied, total = snapshot.entries.len(), "Restored budgets");
        applied
    }
}

impl Default for RateBudgetTracker {
    fn default() -> Self {
        Self::new(ResetPolicy::default())
    }
}

impl std::fmt::Debug for RateBudgetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateBudgetTracker")
            .field("policy", &self.policy)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
