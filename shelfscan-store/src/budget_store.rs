//! Budget snapshot persistence.
//!
//! Budget counters are in-memory in the tracker. The CLI runs one process
//! per lookup, so it saves a [`BudgetSnapshot`] after each run and restores
//! it before the next. Expired windows and unknown sources are dropped by
//! the tracker on restore, not here.

use std::path::{Path, PathBuf};

use shelfscan_core::BudgetSnapshot;
use shelfscan_fetch::RateBudgetTracker;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{default_budget_path, load_json, remove_file, save_json};

/// JSON file holding the last budget snapshot.
#[derive(Debug, Clone)]
pub struct BudgetStore {
    path: PathBuf,
}

impl BudgetStore {
    /// Creates a store for `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates a store at the default cache location.
    pub fn default_location() -> Self {
        Self::new(default_budget_path())
    }

    /// Returns the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved snapshot. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<BudgetSnapshot>, StoreError> {
        match load_json(&self.path).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Saves a snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn save(&self, snapshot: &BudgetSnapshot) -> Result<(), StoreError> {
        save_json(&self.path, snapshot).await
    }

    /// Restores the saved snapshot into `tracker`. Returns the number of
    /// entries applied.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    #[instrument(skip(self, tracker), fields(path = %self.path.display()))]
    pub async fn restore_into(&self, tracker: &RateBudgetTracker) -> Result<usize, StoreError> {
        let Some(snapshot) = self.load().await? else {
            debug!("No saved budgets");
            return Ok(0);
        };
        Ok(tracker.restore(&snapshot))
    }

    /// Saves the tracker's current state.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    #[instrument(skip(self, tracker), fields(path = %self.path.display()))]
    pub async fn save_from(&self, tracker: &RateBudgetTracker) -> Result<(), StoreError> {
        let snapshot = tracker.snapshot();
        debug!(entries = snapshot.entries.len(), "Saving budgets");
        self.save(&snapshot).await
    }

    /// Deletes the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be removed.
    pub async fn clear(&self) -> Result<(), StoreError> {
        remove_file(&self.path).await
    }
}
