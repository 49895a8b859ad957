//! Integration tests for credential issuance, validation, and quotas

use std::sync::Arc;

use namelens::application::credential::{
    CreateApiKeyUseCase, DeactivateApiKeyUseCase, RecordUsageUseCase, ValidateApiKeyUseCase,
};
use namelens::config::{AuthConfig, TierQuotasConfig};
use namelens::domain::credential::{CredentialError, Tier};
use namelens::infrastructure::auth::{ApiKeyGenerator, InMemoryCredentialRepository};

fn generator() -> ApiKeyGenerator {
    ApiKeyGenerator::new("nl_".to_string(), 32)
}

#[tokio::test]
async fn issued_key_round_trips_through_validation() {
    let repo = Arc::new(InMemoryCredentialRepository::new());
    let create = CreateApiKeyUseCase::new(repo.clone(), generator(), TierQuotasConfig::default());

    let issued = create
        .execute("analytics dashboard".to_string(), Tier::Enterprise)
        .await
        .unwrap();
    assert!(issued.plaintext_key.starts_with("nl_"));
    assert_eq!(issued.request_limit, 100_000);

    let validate = ValidateApiKeyUseCase::new(repo, generator(), &AuthConfig::default());
    let validation = validate.execute(&issued.plaintext_key).await.unwrap();
    assert_eq!(validation.tier, Tier::Enterprise);
    assert_eq!(validation.request_limit, 100_000);
}

#[tokio::test]
async fn validation_fails_closed_for_unknown_keys() {
    let repo = Arc::new(InMemoryCredentialRepository::new());
    let validate = ValidateApiKeyUseCase::new(repo, generator(), &AuthConfig::default());

    let result = validate.execute("nl_deadbeef").await;
    assert!(matches!(result, Err(CredentialError::NotFound)));
}

#[tokio::test]
async fn deactivation_takes_effect_immediately() {
    let repo = Arc::new(InMemoryCredentialRepository::new());
    let create = CreateApiKeyUseCase::new(repo.clone(), generator(), TierQuotasConfig::default());
    let issued = create.execute("ci".to_string(), Tier::Basic).await.unwrap();

    let validate = ValidateApiKeyUseCase::new(repo.clone(), generator(), &AuthConfig::default());
    validate.execute(&issued.plaintext_key).await.unwrap();

    DeactivateApiKeyUseCase::new(repo, generator())
        .execute(&issued.plaintext_key)
        .await
        .unwrap();

    let result = validate.execute(&issued.plaintext_key).await;
    assert!(matches!(result, Err(CredentialError::Inactive)));
}

#[tokio::test]
async fn recorded_usage_exhausts_the_historical_quota() {
    let repo = Arc::new(InMemoryCredentialRepository::new());
    let quotas = TierQuotasConfig {
        free: 3,
        ..TierQuotasConfig::default()
    };
    let issued = CreateApiKeyUseCase::new(repo.clone(), generator(), quotas)
        .execute("small".to_string(), Tier::Free)
        .await
        .unwrap();

    let validate = ValidateApiKeyUseCase::new(repo.clone(), generator(), &AuthConfig::default());
    let record = RecordUsageUseCase::new(repo);

    let validation = validate.execute(&issued.plaintext_key).await.unwrap();
    record.execute(&validation.key_hash).await;
    record.execute(&validation.key_hash).await;

    // Two of three used; still admitted.
    validate.execute(&issued.plaintext_key).await.unwrap();

    record.execute(&validation.key_hash).await;
    let result = validate.execute(&issued.plaintext_key).await;
    assert!(matches!(result, Err(CredentialError::QuotaExceeded)));
}

#[tokio::test]
async fn quota_is_captured_at_issuance_time() {
    let repo = Arc::new(InMemoryCredentialRepository::new());

    let early_quotas = TierQuotasConfig {
        basic: 500,
        ..TierQuotasConfig::default()
    };
    let issued = CreateApiKeyUseCase::new(repo.clone(), generator(), early_quotas)
        .execute("legacy".to_string(), Tier::Basic)
        .await
        .unwrap();

    // Retuning the table later does not change already-issued keys.
    let validate = ValidateApiKeyUseCase::new(repo, generator(), &AuthConfig::default());
    let validation = validate.execute(&issued.plaintext_key).await.unwrap();
    assert_eq!(validation.request_limit, 500);
}
