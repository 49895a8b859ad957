//! Credential validation, issuance, and usage accounting

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{AuthConfig, TierQuotasConfig};
use crate::domain::credential::{
    ApiCredential, ApiKeyHash, CredentialError, ICredentialRepository, Tier,
};
use crate::infrastructure::auth::ApiKeyGenerator;

/// Outcome of a successful credential check, carried through the request
#[derive(Debug, Clone)]
pub struct CredentialValidation {
    pub key_hash: ApiKeyHash,
    pub tier: Tier,
    pub request_limit: u32,
}

/// Validate a presented API key and enforce its historical usage quota.
///
/// A presented-but-invalid key is a hard failure; callers must not silently
/// downgrade it to anonymous access.
pub struct ValidateApiKeyUseCase {
    repository: Arc<dyn ICredentialRepository>,
    generator: ApiKeyGenerator,
    usage_lookback_seconds: i64,
}

impl ValidateApiKeyUseCase {
    pub fn new(
        repository: Arc<dyn ICredentialRepository>,
        generator: ApiKeyGenerator,
        config: &AuthConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            usage_lookback_seconds: config.usage_lookback_seconds,
        }
    }

    pub async fn execute(&self, plaintext_key: &str) -> Result<CredentialValidation, CredentialError> {
        let key_hash = self.generator.hash_key(plaintext_key);

        let credential = self
            .repository
            .find_by_hash(&key_hash)
            .await?
            .ok_or(CredentialError::NotFound)?;

        if !credential.is_active {
            return Err(CredentialError::Inactive);
        }

        let since = Utc::now() - Duration::seconds(self.usage_lookback_seconds);
        let used = self.repository.count_usage_since(&key_hash, since).await?;
        if used >= credential.request_limit as i64 {
            debug!(
                key = %self.generator.mask_key(plaintext_key),
                used,
                limit = credential.request_limit,
                "Credential quota exhausted"
            );
            return Err(CredentialError::QuotaExceeded);
        }

        // Best-effort bookkeeping; a failed timestamp never blocks the request.
        if let Err(e) = self.repository.update_last_used(&key_hash, Utc::now()).await {
            warn!(error = %e, "Failed to update credential last-used timestamp");
        }

        Ok(CredentialValidation {
            key_hash,
            tier: credential.tier,
            request_limit: credential.request_limit,
        })
    }
}

/// Record one origin request against a credential (best-effort)
pub struct RecordUsageUseCase {
    repository: Arc<dyn ICredentialRepository>,
}

impl RecordUsageUseCase {
    pub fn new(repository: Arc<dyn ICredentialRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, key_hash: &ApiKeyHash) {
        if let Err(e) = self.repository.record_usage(key_hash).await {
            warn!(error = %e, "Failed to record credential usage");
        }
    }
}

/// A freshly issued key; the plaintext is returned exactly once
#[derive(Debug)]
pub struct IssuedApiKey {
    pub id: uuid::Uuid,
    pub plaintext_key: String,
    pub masked_key: String,
    pub tier: Tier,
    pub request_limit: u32,
}

/// Issue a new API key for a tier, capturing the tier's current quota
pub struct CreateApiKeyUseCase {
    repository: Arc<dyn ICredentialRepository>,
    generator: ApiKeyGenerator,
    quotas: TierQuotasConfig,
}

impl CreateApiKeyUseCase {
    pub fn new(
        repository: Arc<dyn ICredentialRepository>,
        generator: ApiKeyGenerator,
        quotas: TierQuotasConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            quotas,
        }
    }

    pub async fn execute(&self, name: String, tier: Tier) -> Result<IssuedApiKey, CredentialError> {
        let (plaintext_key, key_hash) = self.generator.generate();
        let request_limit = tier.requests_per_window(&self.quotas);

        let credential = ApiCredential::new(key_hash, name, tier, request_limit);
        self.repository.create(&credential).await?;

        Ok(IssuedApiKey {
            id: credential.id,
            masked_key: self.generator.mask_key(&plaintext_key),
            plaintext_key,
            tier,
            request_limit,
        })
    }
}

/// Deactivate a credential by its plaintext key
pub struct DeactivateApiKeyUseCase {
    repository: Arc<dyn ICredentialRepository>,
    generator: ApiKeyGenerator,
}

impl DeactivateApiKeyUseCase {
    pub fn new(repository: Arc<dyn ICredentialRepository>, generator: ApiKeyGenerator) -> Self {
        Self {
            repository,
            generator,
        }
    }

    pub async fn execute(&self, plaintext_key: &str) -> Result<(), CredentialError> {
        let key_hash = self.generator.hash_key(plaintext_key);
        self.repository.deactivate(&key_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::credential_repository::InMemoryCredentialRepository;

    fn generator() -> ApiKeyGenerator {
        ApiKeyGenerator::new("nl_".to_string(), 32)
    }

    fn auth_config() -> AuthConfig {
        AuthConfig::default()
    }

    async fn issue(repo: Arc<InMemoryCredentialRepository>, tier: Tier) -> IssuedApiKey {
        CreateApiKeyUseCase::new(repo, generator(), TierQuotasConfig::default())
            .execute("test".to_string(), tier)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_issued_key_validates_to_its_tier() {
        let repo = Arc::new(InMemoryCredentialRepository::new());
        let issued = issue(repo.clone(), Tier::Premium).await;

        let validate = ValidateApiKeyUseCase::new(repo, generator(), &auth_config());
        let validation = validate.execute(&issued.plaintext_key).await.unwrap();

        assert_eq!(validation.tier, Tier::Premium);
        assert_eq!(validation.request_limit, 10_000);
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let repo = Arc::new(InMemoryCredentialRepository::new());
        let validate = ValidateApiKeyUseCase::new(repo, generator(), &auth_config());

        let result = validate.execute("nl_never_issued").await;
        assert!(matches!(result, Err(CredentialError::NotFound)));
    }

    #[tokio::test]
    async fn test_deactivated_key_is_rejected() {
        let repo = Arc::new(InMemoryCredentialRepository::new());
        let issued = issue(repo.clone(), Tier::Free).await;

        DeactivateApiKeyUseCase::new(repo.clone(), generator())
            .execute(&issued.plaintext_key)
            .await
            .unwrap();

        let validate = ValidateApiKeyUseCase::new(repo, generator(), &auth_config());
        let result = validate.execute(&issued.plaintext_key).await;
        assert!(matches!(result, Err(CredentialError::Inactive)));
    }

    #[tokio::test]
    async fn test_exhausted_usage_quota_is_rejected() {
        let repo = Arc::new(InMemoryCredentialRepository::new());

        // Issue with a quota table shrunk so FREE allows only 2 requests.
        let quotas = TierQuotasConfig {
            free: 2,
            ..TierQuotasConfig::default()
        };
        let issued = CreateApiKeyUseCase::new(repo.clone(), generator(), quotas)
            .execute("tiny".to_string(), Tier::Free)
            .await
            .unwrap();

        let validate = ValidateApiKeyUseCase::new(repo.clone(), generator(), &auth_config());
        let validation = validate.execute(&issued.plaintext_key).await.unwrap();

        let record = RecordUsageUseCase::new(repo.clone());
        record.execute(&validation.key_hash).await;
        record.execute(&validation.key_hash).await;

        let result = validate.execute(&issued.plaintext_key).await;
        assert!(matches!(result, Err(CredentialError::QuotaExceeded)));
    }
}
