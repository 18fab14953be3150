//! Integration tests for core product and resolution types.

use chrono::Utc;
use shelfscan_core::{
    AttemptOutcome, LookupKey, LookupResponse, Normalize, NormalizedProduct, Offer,
    OperationKind, RateBudget, ResolutionAttempt, ResolutionResult, parse_price,
};

fn sample_product() -> NormalizedProduct {
    let mut product = NormalizedProduct::new();
    product.upc = Some("889698572705".to_string());
    product.title = Some("Funko Pop Wonder Woman".to_string());
    let mut offer = Offer::new("Target");
    offer.price = parse_price("$11.99");
    product.offers.push(offer);
    product.derive_price_bounds();
    product
}

#[test]
fn test_normalize_is_idempotent() {
    let product = sample_product();
    assert_eq!(product.normalize(), product.normalize());
}

#[test]
fn test_malformed_price_leaves_bound_absent() {
    let mut product = NormalizedProduct::new();
    let mut offer = Offer::new("Somewhere");
    offer.price = parse_price("N/A");
    product.offers.push(offer);
    product.derive_price_bounds();
    assert_eq!(product.lowest_price, None);
    assert_eq!(product.offers.len(), 1);
}

#[test]
fn test_found_maps_to_200() {
    let mut result = ResolutionResult::found(OperationKind::Lookup, "B", sample_product());
    result
        .usage_snapshot
        .insert("B".to_string(), RateBudget::new(50, Utc::now()));

    let response = LookupResponse::from_result(result);
    assert_eq!(response.status, 200);
    assert!(response.body.found);
    assert_eq!(response.body.source.as_deref(), Some("B"));
    assert_eq!(response.body.usage.len(), 1);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["body"]["product"]["lowestPrice"], 11.99);
}

#[test]
fn test_not_found_maps_to_404() {
    let result = ResolutionResult::not_found(OperationKind::Search);
    let response = LookupResponse::from(result);
    assert_eq!(response.status, 404);
    assert!(!response.body.found);
    assert!(response.body.product.is_none());
    assert!(!response.body.retryable);
}

#[test]
fn test_transient_failure_is_retryable() {
    let mut result = ResolutionResult::not_found(OperationKind::Lookup);
    result.attempts.push(ResolutionAttempt {
        source: "upcitemdb".to_string(),
        outcome: AttemptOutcome::RateLimited,
        error: Some("429".to_string()),
        retry_after_secs: Some(30),
        duration_ms: 12,
    });
    result
        .attempts
        .push(ResolutionAttempt::skipped("ebay", AttemptOutcome::SkippedExhausted));

    assert!(result.had_transient_failure());
    assert_eq!(result.retry_after_secs(), Some(30));
    assert_eq!(result.called_sources(), vec!["upcitemdb"]);
    assert!(LookupResponse::from_result(result).body.retryable);
}

#[test]
fn test_key_kind_drives_operation() {
    assert_eq!(
        LookupKey::parse("889698572705").unwrap().kind(),
        OperationKind::Lookup
    );
    assert_eq!(
        LookupKey::name("Wonder Woman", Some("Funko")).unwrap().kind(),
        OperationKind::Search
    );
}
