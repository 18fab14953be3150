//! Serde shape tests for core types.
//!
//! These pin the JSON field names the CLI and route layers rely on.

use chrono::Utc;
use serde_json::json;

use crate::{
    AttemptOutcome, LookupKey, NormalizedProduct, OperationKind, RateBudget, ResolutionAttempt,
    ResolutionResult,
};

// ============================================================================
// LookupKey
// ============================================================================

#[test]
fn test_lookup_key_tagged_shape() {
    let key = LookupKey::code("889698572705").unwrap();
    let value = serde_json::to_value(&key).unwrap();
    assert_eq!(value, json!({"type": "code", "code": "889698572705"}));

    let key: LookupKey =
        serde_json::from_value(json!({"type": "name", "name": "Wonder Woman"})).unwrap();
    assert_eq!(key.kind(), OperationKind::Search);
}

#[test]
fn test_operation_kind_lowercase() {
    assert_eq!(serde_json::to_string(&OperationKind::Search).unwrap(), r#""search""#);
    let kind: OperationKind = serde_json::from_str(r#""lookup""#).unwrap();
    assert_eq!(kind, OperationKind::Lookup);
}

// ============================================================================
// NormalizedProduct
// ============================================================================

#[test]
fn test_product_defaults_when_fields_missing() {
    let product: NormalizedProduct = serde_json::from_value(json!({"title": "Mug"})).unwrap();
    assert_eq!(product.title.as_deref(), Some("Mug"));
    assert_eq!(product.currency, "USD");
    assert!(product.images.is_empty());
    assert!(product.offers.is_empty());
}

#[test]
fn test_product_skips_absent_optionals() {
    let mut product = NormalizedProduct::new();
    product.lowest_price = Some(3.5);
    let value = serde_json::to_value(&product).unwrap();
    assert_eq!(value["lowestPrice"], 3.5);
    assert!(value.get("highestPrice").is_none());
    assert_eq!(value["images"], json!([]));
}

// ============================================================================
// ResolutionResult
// ============================================================================

#[test]
fn test_resolution_result_field_names() {
    let mut result = ResolutionResult::not_found(OperationKind::Lookup);
    result
        .usage_snapshot
        .insert("upcitemdb".to_string(), RateBudget::new(100, Utc::now()));
    result.attempts.push(ResolutionAttempt::skipped(
        "ebay",
        AttemptOutcome::SkippedUnconfigured,
    ));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["found"], false);
    assert!(value["source"].is_null());
    assert!(value["product"].is_null());
    assert_eq!(value["usageSnapshot"]["upcitemdb"]["limit"], 100);
    assert_eq!(value["attempts"][0]["outcome"], "skipped_unconfigured");
    assert_eq!(value["attempts"][0]["durationMs"], 0);
}

#[test]
fn test_attempt_outcome_matches_as_str() {
    let outcomes = [
        AttemptOutcome::Success,
        AttemptOutcome::SkippedExhausted,
        AttemptOutcome::RateLimited,
        AttemptOutcome::TransportFailure,
    ];
    for outcome in outcomes {
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, format!("\"{}\"", outcome.as_str()));
    }
}
