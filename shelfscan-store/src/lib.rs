// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # shelfscan Store
//!
//! Persistent state for shelfscan.
//!
//! This crate provides:
//!
//! - **Settings**: Per-source overrides, reset policy and timeouts, loaded
//!   from JSON with defaults for anything missing
//! - **BudgetStore**: Saves and restores rate budget counters between runs
//! - **Persistence**: Atomic, owner-only JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use shelfscan_fetch::RateBudgetTracker;
//! use shelfscan_store::{BudgetStore, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await.get().await;
//! let tracker = Arc::new(RateBudgetTracker::new(settings.policy()));
//!
//! // Register sources, then pick up where the last run left off
//! let budgets = BudgetStore::default_location();
//! budgets.restore_into(&tracker).await?;
//! // ... resolve ...
//! budgets.save_from(&tracker).await?;
//! ```

pub mod budget_store;
pub mod error;
pub mod persistence;
pub mod settings;

pub use budget_store::BudgetStore;
pub use error::StoreError;
pub use persistence::{
    default_budget_path, default_cache_dir, default_config_dir, default_settings_path,
    load_json, load_json_or_default, save_json,
};
pub use settings::{ResetPolicySetting, Settings, SettingsStore, SourceSettings};

#[cfg(test)]
mod persistence_tests;
