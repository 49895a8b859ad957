//! Credential repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entities::ApiCredential;
use super::errors::CredentialError;
use super::value_objects::ApiKeyHash;

/// Repository interface for API credentials and their usage bookkeeping.
///
/// `count_usage_since` backs the secondary per-credential quota check; it is
/// independent bookkeeping from the rate limiter's fixed-window counter and
/// the two are deliberately not collapsed into one.
#[async_trait]
pub trait ICredentialRepository: Send + Sync {
    async fn find_by_hash(
        &self,
        key_hash: &ApiKeyHash,
    ) -> Result<Option<ApiCredential>, CredentialError>;

    async fn create(&self, credential: &ApiCredential) -> Result<(), CredentialError>;

    /// Set `is_active = false`; subsequent validations fail closed immediately
    async fn deactivate(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError>;

    async fn update_last_used(
        &self,
        key_hash: &ApiKeyHash,
        used_at: DateTime<Utc>,
    ) -> Result<(), CredentialError>;

    /// Append one usage row for the credential (origin request accounting)
    async fn record_usage(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError>;

    /// Count origin requests attributed to the credential since `since`
    async fn count_usage_since(
        &self,
        key_hash: &ApiKeyHash,
        since: DateTime<Utc>,
    ) -> Result<i64, CredentialError>;
}
