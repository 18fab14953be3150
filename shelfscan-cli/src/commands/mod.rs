//! CLI command implementations.

pub mod budget;
pub mod config;
pub mod lookup;
pub mod search;
pub mod sources;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use shelfscan_core::{CoreError, LookupKey, ResolutionResult};
use shelfscan_fetch::{FetchContext, ProcessEnv, RateBudgetTracker, Resolver};
use shelfscan_sources::{SourceConfig, SourceRegistry};
use shelfscan_store::{BudgetStore, Settings, SettingsStore, SourceSettings};
use tracing::{debug, info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

// ============================================================================
// Settings
// ============================================================================

/// Loads settings from `--settings` or the default path.
pub async fn load_settings(cli: &Cli) -> Settings {
    let store = match &cli.settings {
        Some(path) => SettingsStore::load(path.clone()).await,
        None => SettingsStore::load_default().await,
    };
    store.get().await
}

/// Maps stored per-source settings onto registry overrides.
pub fn source_configs(settings: &Settings) -> BTreeMap<String, SourceConfig> {
    settings
        .sources
        .iter()
        .map(|(id, s)| (id.to_ascii_lowercase(), to_source_config(s)))
        .collect()
}

fn to_source_config(settings: &SourceSettings) -> SourceConfig {
    SourceConfig {
        enabled: settings.enabled,
        priority: settings.priority,
        api_key_env: settings.api_key_env.clone(),
        lookup_limit: settings.lookup_limit,
        search_limit: settings.search_limit,
        min_spacing_ms: settings.min_spacing_ms,
    }
}

/// Parses `--source`. `None` and `"all"` mean every source.
///
/// # Errors
///
/// Returns `CoreError::UnknownSource` for a name the registry does not know.
pub fn parse_source_selection(arg: Option<&str>) -> Result<Option<Vec<String>>, CoreError> {
    let Some(arg) = arg.map(str::trim) else {
        return Ok(None);
    };
    if arg.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    let mut ids = Vec::new();
    for name in arg.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let desc = SourceRegistry::get(name)
            .ok_or_else(|| CoreError::UnknownSource(name.to_string()))?;
        if !ids.iter().any(|id| id == desc.id) {
            ids.push(desc.id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(CoreError::UnknownSource(arg.to_string()));
    }
    Ok(Some(ids))
}

// ============================================================================
// Session
// ============================================================================

/// A resolver built from settings and flags, with optional budget
/// persistence around it.
pub struct Session {
    /// The configured resolver.
    pub resolver: Resolver,
    budgets: Option<BudgetStore>,
}

impl Session {
    /// Builds the resolver and restores saved budgets.
    pub async fn open(cli: &Cli) -> Result<Self> {
        let settings = load_settings(cli).await;
        let selection = parse_source_selection(cli.source.as_deref())?;

        let timeout = cli
            .timeout
            .filter(|secs| *secs > 0)
            .map_or_else(|| settings.timeout(), std::time::Duration::from_secs);
        let mut builder = FetchContext::builder().timeout(timeout);
        if let Some(ids) = selection {
            builder = builder.only_sources(ids);
        }
        let ctx = builder.build();

        let tracker = Arc::new(RateBudgetTracker::new(settings.policy()));
        let resolver = SourceRegistry::build_resolver(
            ctx,
            tracker,
            &ProcessEnv,
            &source_configs(&settings),
        );

        let budgets = if settings.persist_budgets && !cli.no_persist {
            let store = BudgetStore::default_location();
            match store.restore_into(resolver.tracker()).await {
                Ok(applied) => debug!(applied, "Budgets restored"),
                Err(e) => warn!(error = %e, "Could not restore budgets, starting fresh"),
            }
            Some(store)
        } else {
            debug!("Budget persistence disabled");
            None
        };

        Ok(Self { resolver, budgets })
    }

    /// Returns true if budgets outlive this process.
    pub fn persists_budgets(&self) -> bool {
        self.budgets.is_some()
    }

    /// Saves budgets if persistence is on. Failures are logged.
    pub async fn finish(&self) {
        if let Some(store) = &self.budgets {
            if let Err(e) = store.save_from(self.resolver.tracker()).await {
                warn!(error = %e, "Could not save budgets");
            }
        }
    }

    /// Resolves a key, saves budgets, and prints the outcome.
    pub async fn resolve_and_print(&self, key: &LookupKey, cli: &Cli) -> Result<ExitCode> {
        info!(key = %key, "Resolving");
        let result = self.resolver.resolve(key).await;
        self.finish().await;

        let code = if result.found {
            ExitCode::Success
        } else {
            ExitCode::NotFound
        };
        print_resolution(result, cli)?;
        Ok(code)
    }
}

/// Prints a resolution in the selected format.
fn print_resolution(result: ResolutionResult, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if result.found {
                println!("{}", formatter.format_product(&result));
            } else {
                println!("{}", formatter.format_not_found(&result));
            }
            if cli.verbose {
                println!();
                println!("{}", formatter.format_attempts(&result.attempts));
            }
            if !result.usage_snapshot.is_empty() {
                println!();
                println!(
                    "{}",
                    formatter.format_usage(&result.usage_snapshot, result.kind)
                );
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_resolution(result)?);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
