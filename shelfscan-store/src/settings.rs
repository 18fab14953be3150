//! User settings.
//!
//! Settings live in one JSON file. A missing file means defaults; a file
//! that cannot be read or holds unusable values is logged and replaced by
//! defaults, so a bad edit never stops a lookup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelfscan_fetch::ResetPolicy;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Longest rolling window accepted, one year.
pub const MAX_WINDOW_HOURS: u32 = 8760;

// ============================================================================
// Settings Types
// ============================================================================

/// Overrides for one source. Unset fields keep the source's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Whether the source takes part in resolution.
    pub enabled: bool,
    /// Priority override; lower runs first.
    pub priority: Option<u32>,
    /// Environment variable to read the credential from instead of the
    /// source's usual names.
    pub api_key_env: Option<String>,
    /// Code lookups per window.
    pub lookup_limit: Option<u32>,
    /// Name searches per window.
    pub search_limit: Option<u32>,
    /// Minimum gap between calls, in milliseconds.
    pub min_spacing_ms: Option<u64>,
}

impl Default for SourceSettings {
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

/// When budget windows end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResetPolicySetting {
    /// Fixed windows of `window_hours`.
    Rolling {
        /// Window length in hours.
        window_hours: u32,
    },
    /// Windows end at each UTC midnight.
    UtcMidnight,
}

impl Default for ResetPolicySetting {
    fn default() -> Self {
        Self::Rolling { window_hours: 24 }
    }
}

impl ResetPolicySetting {
    /// Converts to the tracker's policy.
    pub fn to_policy(self) -> ResetPolicy {
        match self {
            Self::Rolling { window_hours } => {
                ResetPolicy::Rolling(chrono::Duration::hours(i64::from(window_hours)))
            }
            Self::UtcMidnight => ResetPolicy::UtcMidnight,
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-source overrides, keyed by source ID.
    pub sources: BTreeMap<String, SourceSettings>,

    /// Budget window policy.
    pub reset_policy: ResetPolicySetting,

    /// Deadline for one source call, in seconds.
    pub timeout_secs: u64,

    /// Keep budget counters between runs.
    pub persist_budgets: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            reset_policy: ResetPolicySetting::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            persist_budgets: true,
        }
    }
}

impl Settings {
    /// Returns the overrides for a source, if any.
    pub fn source(&self, id: &str) -> Option<&SourceSettings> {
        self.sources.get(id)
    }

    /// Returns the overrides for a source, inserting defaults if absent.
    pub fn source_mut(&mut self, id: &str) -> &mut SourceSettings {
        self.sources.entry(id.to_string()).or_default()
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the tracker policy.
    pub fn policy(&self) -> ResetPolicy {
        self.reset_policy.to_policy()
    }

    /// Checks values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the first bad value.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be positive".into()));
        }
        if let ResetPolicySetting::Rolling { window_hours } = self.reset_policy {
            if window_hours == 0 {
                return Err(StoreError::Config(
                    "reset_policy.window_hours must be positive".into(),
                ));
            }
            if window_hours > MAX_WINDOW_HOURS {
                return Err(StoreError::Config(format!(
                    "reset_policy.window_hours must be at most {MAX_WINDOW_HOURS}"
                )));
            }
        }
        for (id, source) in &self.sources {
            if source.priority == Some(0) {
                return Err(StoreError::Config(format!("{id}: priority starts at 1")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to the file they were loaded from.
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<Settings>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults for `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: RwLock::new(Settings::default()),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path, falling back to defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            match load_json::<Settings>(&path).await {
                Ok(settings) => match settings.validate() {
                    Ok(()) => settings,
                    Err(e) => {
                        warn!(error = %e, "Invalid settings, using defaults");
                        Settings::default()
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Failed to load settings, using defaults");
                    Settings::default()
                }
            }
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self {
            settings: RwLock::new(settings),
            path,
        }
    }

    /// Returns the file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if the settings are invalid or cannot be written.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
