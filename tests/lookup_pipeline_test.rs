//! Integration tests for the cache-first lookup pipeline

mod common;

use std::sync::Arc;

use common::{MockNameRepository, NameRecordFactory, lookup_service};
use namelens::domain::lookup::{Gender, LookupError};

#[tokio::test]
async fn second_lookup_is_served_without_touching_the_origin() {
    let origin = Arc::new(MockNameRepository::new(NameRecordFactory::sample_records()));
    let service = lookup_service(origin.clone());

    let first = service.lookup("ali").await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.result.gender, Gender::Male);
    assert_eq!(origin.find_calls(), 1);

    let second = service.lookup("ali").await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.result, first.result);
    assert_eq!(origin.find_calls(), 1);
}

#[tokio::test]
async fn lookup_normalizes_case_and_whitespace() {
    let origin = Arc::new(MockNameRepository::new(NameRecordFactory::sample_records()));
    let service = lookup_service(origin.clone());

    service.lookup("Sara").await.unwrap();
    let outcome = service.lookup("  SARA  ").await.unwrap();

    assert!(outcome.cache_hit);
    assert_eq!(outcome.result.name, "sara");
    assert_eq!(origin.find_calls(), 1);
}

#[tokio::test]
async fn unknown_names_produce_cached_zero_confidence_results() {
    let origin = Arc::new(MockNameRepository::new(vec![]));
    let service = lookup_service(origin.clone());

    let first = service.lookup("xyz").await.unwrap();
    assert_eq!(first.result.confidence, 0.0);
    assert_eq!(first.result.gender, Gender::Unknown);

    let second = service.lookup("xyz").await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(origin.find_calls(), 1);
}

#[tokio::test]
async fn origin_failure_fails_a_single_lookup() {
    let service = lookup_service(Arc::new(MockNameRepository::failing()));

    let result = service.lookup("ali").await;
    assert!(matches!(result, Err(LookupError::Storage { .. })));
}

#[tokio::test]
async fn batch_returns_one_result_per_input_in_order() {
    let origin = Arc::new(MockNameRepository::new(NameRecordFactory::sample_records()));
    let service = lookup_service(origin);

    let names: Vec<String> = ["ali", "unknown1", "sara", "", "maryam"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let outcome = service.lookup_batch(&names).await;

    assert_eq!(outcome.results.len(), names.len());
    assert_eq!(outcome.results[0].result.name, "ali");
    assert_eq!(outcome.results[2].result.name, "sara");
    assert_eq!(outcome.results[4].result.name, "maryam");

    // The empty item failed; the unknown item resolved with zero confidence.
    assert_eq!(outcome.error_count, 1);
    assert_eq!(outcome.results[1].result.confidence, 0.0);
    assert_eq!(outcome.results[3].result.confidence, 0.0);
}

#[tokio::test]
async fn batch_with_failing_origin_degrades_every_item() {
    let service = lookup_service(Arc::new(MockNameRepository::failing()));

    let names: Vec<String> = (0..5).map(|i| format!("name{}", i)).collect();
    let outcome = service.lookup_batch(&names).await;

    assert_eq!(outcome.results.len(), 5);
    assert_eq!(outcome.error_count, 5);
    for item in &outcome.results {
        assert_eq!(item.result.confidence, 0.0);
        assert_eq!(item.result.gender, Gender::Unknown);
    }
}

#[tokio::test]
async fn batch_counts_only_origin_misses() {
    let origin = Arc::new(MockNameRepository::new(NameRecordFactory::sample_records()));
    let service = lookup_service(origin.clone());

    service.lookup("ali").await.unwrap();

    let names: Vec<String> = ["ali", "sara"].iter().map(|s| s.to_string()).collect();
    let outcome = service.lookup_batch(&names).await;

    assert_eq!(outcome.origin_misses, 1);
    assert_eq!(origin.find_calls(), 2);
}

#[tokio::test]
async fn warming_preloads_results_for_later_hits() {
    let origin = Arc::new(MockNameRepository::new(NameRecordFactory::sample_records()));
    let service = lookup_service(origin.clone());

    let warmed = service.warm_cache().await.unwrap();
    assert_eq!(warmed, 4);

    for name in ["ali", "sara", "hassan", "maryam"] {
        let outcome = service.lookup(name).await.unwrap();
        assert!(outcome.cache_hit, "{} should have been preloaded", name);
    }
    assert_eq!(origin.find_calls(), 0);
}
