//! Source descriptor system.
//!
//! A descriptor holds everything static about a vendor source:
//! - Metadata (display name, homepage)
//! - Default tuning (priority, budget limits, pacing)
//! - The credential variables it reads
//! - A constructor that builds the live [`ProductSource`]

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelfscan_core::OperationKind;
use shelfscan_fetch::{BudgetLimits, CredentialSource, ProductSource};

// ============================================================================
// Tuning
// ============================================================================

/// Scheduling knobs for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTuning {
    /// Resolution order; lower is tried first.
    pub priority: u32,
    /// Calls per budget window.
    pub limits: BudgetLimits,
    /// Minimum gap between two outbound calls.
    pub min_spacing: Duration,
}

impl SourceTuning {
    /// Creates a tuning.
    pub const fn new(priority: u32, limits: BudgetLimits, min_spacing: Duration) -> Self {
        Self {
            priority,
            limits,
            min_spacing,
        }
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// User overrides for one source. Unset fields keep the descriptor default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Whether the source takes part in resolution.
    pub enabled: bool,
    /// Priority override.
    pub priority: Option<u32>,
    /// Name of the variable holding the primary credential.
    pub api_key_env: Option<String>,
    /// Lookup limit override.
    pub lookup_limit: Option<u32>,
    /// Search limit override.
    pub search_limit: Option<u32>,
    /// Minimum spacing override, in milliseconds.
    pub min_spacing_ms: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: None,
            api_key_env: None,
            lookup_limit: None,
            search_limit: None,
            min_spacing_ms: None,
        }
    }
}

impl SourceConfig {
    /// Applies these overrides on top of `defaults`.
    pub fn apply(&self, defaults: SourceTuning) -> SourceTuning {
        SourceTuning {
            priority: self.priority.unwrap_or(defaults.priority),
            limits: BudgetLimits::new(
                self.lookup_limit.unwrap_or(defaults.limits.lookup),
                self.search_limit.unwrap_or(defaults.limits.search),
            ),
            min_spacing: self
                .min_spacing_ms
                .map_or(defaults.min_spacing, Duration::from_millis),
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Inputs handed to a descriptor's constructor.
pub struct SourceSetup<'a> {
    /// Effective tuning after overrides.
    pub tuning: SourceTuning,
    /// Where credentials are read from.
    pub credentials: &'a dyn CredentialSource,
    /// Replacement name for the primary credential variable.
    pub key_env: Option<&'a str>,
}

impl SourceSetup<'_> {
    /// Reads the primary credential: the override variable if one is set,
    /// otherwise the first of `defaults` that holds a value.
    pub fn credential(&self, defaults: &[&str]) -> Option<String> {
        match self.key_env {
            Some(name) => self.credentials.get(name),
            None => self.credentials.first(defaults),
        }
    }
}

// ============================================================================
// Source Descriptor
// ============================================================================

/// Complete static description of a vendor source.
pub struct SourceDescriptor {
    /// Stable identifier.
    pub id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Vendor homepage.
    pub homepage: &'static str,
    /// Operation kinds the source implements.
    pub kinds: &'static [OperationKind],
    /// Default tuning.
    pub defaults: SourceTuning,
    /// Variables the primary credential is read from, in order.
    pub credential_envs: &'static [&'static str],
    /// Whether the source works without any credential.
    pub credential_optional: bool,
    /// Builds the live source.
    pub build_source: fn(&SourceSetup<'_>) -> Arc<dyn ProductSource>,
}

impl SourceDescriptor {
    /// Returns the effective tuning under `config`.
    pub fn tuning(&self, config: &SourceConfig) -> SourceTuning {
        config.apply(self.defaults)
    }

    /// Builds the source with `config` applied and credentials read from `credentials`.
    pub fn build(
        &self,
        credentials: &dyn CredentialSource,
        config: &SourceConfig,
    ) -> Arc<dyn ProductSource> {
        let setup = SourceSetup {
            tuning: self.tuning(config),
            credentials,
            key_env: config.api_key_env.as_deref(),
        };
        (self.build_source)(&setup)
    }

    /// Returns true if the source implements `kind`.
    pub fn supports(&self, kind: OperationKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl std::fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("id", &self.id)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
