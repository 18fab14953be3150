//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, settings loading and budget snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use shelfscan_core::OperationKind;
use shelfscan_fetch::{BudgetLimits, ManualClock, RateBudgetTracker, ResetPolicy};
use tempfile::TempDir;

use crate::budget_store::BudgetStore;
use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json};
use crate::settings::{ResetPolicySetting, Settings, SettingsStore};

fn tracker_at(clock: Arc<ManualClock>) -> RateBudgetTracker {
    let tracker = RateBudgetTracker::with_clock(ResetPolicy::daily(), clock);
    tracker.register("upcitemdb", BudgetLimits::new(100, 20));
    tracker.register("ebay", BudgetLimits::new(5000, 5000));
    tracker
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let settings = Settings::default();
    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    let data = serde_json::json!({"key": "value"});
    save_json(&nested_path, &data).await.unwrap();

    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let err = load_json::<Settings>(&file_path).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_load_or_default_on_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("broken.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let settings: Settings = load_json_or_default(&file_path).await;
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store
        .update(|s| {
            s.timeout_secs = 12;
            s.persist_budgets = false;
            s.reset_policy = ResetPolicySetting::UtcMidnight;
            let ebay = s.source_mut("ebay");
            ebay.enabled = false;
            ebay.api_key_env = Some("MY_EBAY_TOKEN".to_string());
            s.source_mut("upcitemdb").min_spacing_ms = Some(500);
        })
        .await;
    store.save().await.unwrap();

    let loaded = SettingsStore::load(file_path).await.get().await;
    assert_eq!(loaded, store.get().await);
    assert_eq!(loaded.reset_policy, ResetPolicySetting::UtcMidnight);
    assert_eq!(
        loaded.source("ebay").unwrap().api_key_env.as_deref(),
        Some("MY_EBAY_TOKEN")
    );
}

#[tokio::test]
async fn test_settings_missing_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::load(temp_dir.path().join("absent.json")).await;
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_settings_corrupt_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"timeout_secs": "soon"}"#)
        .await
        .unwrap();

    let store = SettingsStore::load(file_path).await;
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_settings_invalid_values_are_default() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"timeout_secs": 0, "persist_budgets": false}"#)
        .await
        .unwrap();

    let store = SettingsStore::load(file_path).await;
    assert!(store.get().await.persist_budgets);
}

#[tokio::test]
async fn test_save_rejects_invalid_settings() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    let store = SettingsStore::new(file_path.clone());
    store.update(|s| s.timeout_secs = 0).await;

    assert!(store.save().await.is_err());
    assert!(!file_path.exists());
}

// ============================================================================
// Budget Store Tests
// ============================================================================

#[tokio::test]
async fn test_budget_missing_file_restores_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = BudgetStore::new(temp_dir.path().join("budgets.json"));
    let tracker = tracker_at(Arc::new(ManualClock::new(start())));

    assert!(store.load().await.unwrap().is_none());
    assert_eq!(store.restore_into(&tracker).await.unwrap(), 0);
}

#[tokio::test]
async fn test_budget_roundtrip_across_trackers() {
    let temp_dir = TempDir::new().unwrap();
    let store = BudgetStore::new(temp_dir.path().join("cache").join("budgets.json"));
    let clock = Arc::new(ManualClock::new(start()));

    let first = tracker_at(clock.clone());
    first.consume("upcitemdb", OperationKind::Lookup);
    first.consume("upcitemdb", OperationKind::Lookup);
    first.consume("ebay", OperationKind::Search);
    store.save_from(&first).await.unwrap();

    clock.advance(Duration::minutes(10));
    let second = tracker_at(clock);
    let applied = store.restore_into(&second).await.unwrap();

    assert_eq!(applied, 4);
    assert_eq!(second.check_remaining("upcitemdb", OperationKind::Lookup), 98);
    assert_eq!(second.check_remaining("ebay", OperationKind::Search), 4999);
    assert_eq!(second.check_remaining("upcitemdb", OperationKind::Search), 20);
}

#[tokio::test]
async fn test_budget_expired_window_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let store = BudgetStore::new(temp_dir.path().join("budgets.json"));
    let clock = Arc::new(ManualClock::new(start()));

    let first = tracker_at(clock.clone());
    first.consume("upcitemdb", OperationKind::Lookup);
    store.save_from(&first).await.unwrap();

    clock.advance(Duration::hours(25));
    let second = tracker_at(clock);
    assert_eq!(store.restore_into(&second).await.unwrap(), 0);
    assert_eq!(second.check_remaining("upcitemdb", OperationKind::Lookup), 100);
}

#[tokio::test]
async fn test_budget_unknown_source_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let store = BudgetStore::new(temp_dir.path().join("budgets.json"));
    let clock = Arc::new(ManualClock::new(start()));

    let first = tracker_at(clock.clone());
    first.register("retired", BudgetLimits::new(10, 10));
    first.consume("retired", OperationKind::Lookup);
    store.save_from(&first).await.unwrap();

    let second = tracker_at(clock);
    store.restore_into(&second).await.unwrap();
    assert!(!second.is_registered("retired"));
}

#[tokio::test]
async fn test_budget_corrupt_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("budgets.json");
    tokio::fs::write(&path, "[1, 2").await.unwrap();

    let store = BudgetStore::new(path);
    assert!(store.load().await.is_err());
}

#[tokio::test]
async fn test_budget_clear() {
    let temp_dir = TempDir::new().unwrap();
    let store = BudgetStore::new(temp_dir.path().join("budgets.json"));
    let tracker = tracker_at(Arc::new(ManualClock::new(start())));

    store.save_from(&tracker).await.unwrap();
    assert!(store.path().exists());

    store.clear().await.unwrap();
    assert!(!store.path().exists());
    store.clear().await.unwrap();
}
