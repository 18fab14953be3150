//! Source registry.
//!
//! The registry gives static access to every source descriptor and turns
//! them, together with user overrides and credentials, into a ready
//! [`Resolver`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use shelfscan_fetch::{
    CredentialSource, FetchContext, ProcessEnv, ProductSource, RateBudgetTracker, Resolver,
};
use tracing::debug;

use crate::barcodelookup::barcodelookup_descriptor;
use crate::descriptor::{SourceConfig, SourceDescriptor};
use crate::ebay::ebay_descriptor;
use crate::upcitemdb::upcitemdb_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all source descriptors.
static DESCRIPTORS: OnceLock<Vec<SourceDescriptor>> = OnceLock::new();

/// Initializes all source descriptors, in default priority order.
fn init_descriptors() -> Vec<SourceDescriptor> {
    vec![
        upcitemdb_descriptor(),
        barcodelookup_descriptor(),
        ebay_descriptor(),
    ]
}

// ============================================================================
// Source Registry
// ============================================================================

/// Global registry of all source descriptors.
pub struct SourceRegistry;

impl SourceRegistry {
    /// Returns all source descriptors.
    pub fn all() -> &'static [SourceDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a descriptor by ID, ignoring case.
    pub fn get(id: &str) -> Option<&'static SourceDescriptor> {
        Self::all().iter().find(|d| d.id.eq_ignore_ascii_case(id))
    }

    /// Returns the number of registered sources.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all source IDs.
    pub fn ids() -> Vec<&'static str> {
        Self::all().iter().map(|d| d.id).collect()
    }

    /// Builds every enabled source.
    ///
    /// Sources without an entry in `configs` use their defaults.
    pub fn build_sources(
        credentials: &dyn CredentialSource,
        configs: &BTreeMap<String, SourceConfig>,
    ) -> Vec<Arc<dyn ProductSource>> {
        let default = SourceConfig::default();
        Self::all()
            .iter()
            .filter_map(|descriptor| {
                let config = configs.get(descriptor.id).unwrap_or(&default);
                if config.enabled {
                    Some(descriptor.build(credentials, config))
                } else {
                    debug!(source = descriptor.id, "Source disabled in settings");
                    None
                }
            })
            .collect()
    }

    /// Builds a resolver over every enabled source.
    pub fn build_resolver(
        ctx: FetchContext,
        tracker: Arc<RateBudgetTracker>,
        credentials: &dyn CredentialSource,
        configs: &BTreeMap<String, SourceConfig>,
    ) -> Resolver {
        let mut resolver = Resolver::new(ctx, tracker);
        for source in Self::build_sources(credentials, configs) {
            resolver.add_source(source);
        }
        debug!(sources = resolver.len(), "Resolver built");
        resolver
    }

    /// Builds a resolver with default tuning and credentials from the
    /// process environment.
    pub fn from_env(ctx: FetchContext, tracker: Arc<RateBudgetTracker>) -> Resolver {
        Self::build_resolver(ctx, tracker, &ProcessEnv, &BTreeMap::new())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_core::OperationKind;
    use shelfscan_fetch::{ResetPolicy, StaticCredentials};

    fn tracker() -> Arc<RateBudgetTracker> {
        Arc::new(RateBudgetTracker::new(ResetPolicy::daily()))
    }

    #[test]
    fn test_registry_has_three_sources() {
        assert_eq!(SourceRegistry::count(), 3);
        assert_eq!(
            SourceRegistry::ids(),
            vec!["upcitemdb", "barcodelookup", "ebay"]
        );
    }

    #[test]
    fn test_get_ignores_case() {
        let desc = SourceRegistry::get("eBay").unwrap();
        assert_eq!(desc.id, "ebay");
        assert!(desc.supports(OperationKind::Search));
        assert!(SourceRegistry::get("amazon").is_none());
    }

    #[test]
    fn test_default_priorities_are_distinct_and_ordered() {
        let priorities: Vec<u32> = SourceRegistry::all()
            .iter()
            .map(|d| d.defaults.priority)
            .collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn test_only_upcitemdb_configured_without_credentials() {
        let resolver = SourceRegistry::build_resolver(
            FetchContext::new(),
            tracker(),
            &StaticCredentials::new(),
            &BTreeMap::new(),
        );
        let configured: Vec<String> = resolver
            .source_info()
            .into_iter()
            .filter(|s| s.configured)
            .map(|s| s.id)
            .collect();
        assert_eq!(resolver.len(), 3);
        assert_eq!(configured, vec!["upcitemdb"]);
    }

    #[test]
    fn test_disabled_source_is_left_out() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "ebay".to_string(),
            SourceConfig {
                enabled: false,
                ..SourceConfig::default()
            },
        );
        let sources = SourceRegistry::build_sources(&StaticCredentials::new(), &configs);
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.id() != "ebay"));
    }

    #[test]
    fn test_priority_override_reorders() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "upcitemdb".to_string(),
            SourceConfig {
                priority: Some(10),
                lookup_limit: Some(7),
                ..SourceConfig::default()
            },
        );
        let creds = StaticCredentials::new().with("SHELFSCAN_BARCODELOOKUP_KEY", "k");
        let resolver =
            SourceRegistry::build_resolver(FetchContext::new(), tracker(), &creds, &configs);

        let order: Vec<&str> = resolver.adapters().iter().map(|a| a.id()).collect();
        assert_eq!(order, vec!["barcodelookup", "ebay", "upcitemdb"]);
        assert_eq!(
            resolver
                .tracker()
                .check_remaining("upcitemdb", OperationKind::Lookup),
            7
        );
    }
}
