//! Credential repository implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::credential::{
    ApiCredential, ApiKeyHash, CredentialError, ICredentialRepository, Tier,
};

/// Postgres-backed credential repository
pub struct SqlxCredentialRepository {
    pool: Arc<PgPool>,
}

impl SqlxCredentialRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Result<ApiCredential, CredentialError> {
        let storage_err = |e: sqlx::Error| CredentialError::Storage {
            message: e.to_string(),
        };

        let tier_str: String = row.try_get("tier").map_err(storage_err)?;
        let tier: Tier = tier_str
            .parse()
            .map_err(|message: String| CredentialError::Storage { message })?;
        let request_limit: i32 = row.try_get("request_limit").map_err(storage_err)?;

        Ok(ApiCredential {
            id: row.try_get("id").map_err(storage_err)?,
            key_hash: ApiKeyHash::new(row.try_get("key_hash").map_err(storage_err)?),
            name: row.try_get("name").map_err(storage_err)?,
            tier,
            request_limit: request_limit as u32,
            is_active: row.try_get("is_active").map_err(storage_err)?,
            created_at: row.try_get("created_at").map_err(storage_err)?,
            last_used_at: row.try_get("last_used_at").map_err(storage_err)?,
        })
    }
}

#[async_trait]
impl ICredentialRepository for SqlxCredentialRepository {
    async fn find_by_hash(
        &self,
        key_hash: &ApiKeyHash,
    ) -> Result<Option<ApiCredential>, CredentialError> {
        let row = sqlx::query(
            r#"
            SELECT id, key_hash, name, tier, request_limit, is_active, created_at, last_used_at
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query credential");
            CredentialError::Storage {
                message: e.to_string(),
            }
        })?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn create(&self, credential: &ApiCredential) -> Result<(), CredentialError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, key_hash, name, tier, request_limit, is_active, created_at, last_used_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(credential.id)
        .bind(credential.key_hash.as_str())
        .bind(&credential.name)
        .bind(credential.tier.as_str())
        .bind(credential.request_limit as i32)
        .bind(credential.is_active)
        .bind(credential.created_at)
        .bind(credential.last_used_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create credential");
            CredentialError::Storage {
                message: e.to_string(),
            }
        })?;

        Ok(())
    }

    async fn deactivate(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE key_hash = $1")
            .bind(key_hash.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to deactivate credential");
                CredentialError::Storage {
                    message: e.to_string(),
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::NotFound);
        }

        Ok(())
    }

    async fn update_last_used(
        &self,
        key_hash: &ApiKeyHash,
        used_at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE key_hash = $1")
            .bind(key_hash.as_str())
            .bind(used_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| CredentialError::Storage {
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn record_usage(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError> {
        sqlx::query("INSERT INTO api_key_usage (key_hash, used_at) VALUES ($1, $2)")
            .bind(key_hash.as_str())
            .bind(Utc::now())
            .execute(&*self.pool)
            .await
            .map_err(|e| CredentialError::Storage {
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn count_usage_since(
        &self,
        key_hash: &ApiKeyHash,
        since: DateTime<Utc>,
    ) -> Result<i64, CredentialError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM api_key_usage WHERE key_hash = $1 AND used_at >= $2",
        )
        .bind(key_hash.as_str())
        .bind(since)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count credential usage");
            CredentialError::Storage {
                message: e.to_string(),
            }
        })?;

        row.try_get("total").map_err(|e| CredentialError::Storage {
            message: e.to_string(),
        })
    }
}

/// In-memory credential repository for development and tests
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<HashMap<String, ApiCredential>>,
    usage: RwLock<Vec<(String, DateTime<Utc>)>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ICredentialRepository for InMemoryCredentialRepository {
    async fn find_by_hash(
        &self,
        key_hash: &ApiKeyHash,
    ) -> Result<Option<ApiCredential>, CredentialError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(key_hash.as_str()).cloned())
    }

    async fn create(&self, credential: &ApiCredential) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write().await;
        credentials.insert(credential.key_hash.as_str().to_string(), credential.clone());
        Ok(())
    }

    async fn deactivate(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write().await;
        match credentials.get_mut(key_hash.as_str()) {
            Some(credential) => {
                credential.deactivate();
                Ok(())
            }
            None => Err(CredentialError::NotFound),
        }
    }

    async fn update_last_used(
        &self,
        key_hash: &ApiKeyHash,
        used_at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let mut credentials = self.credentials.write().await;
        if let Some(credential) = credentials.get_mut(key_hash.as_str()) {
            credential.last_used_at = Some(used_at);
        }
        Ok(())
    }

    async fn record_usage(&self, key_hash: &ApiKeyHash) -> Result<(), CredentialError> {
        let mut usage = self.usage.write().await;
        usage.push((key_hash.as_str().to_string(), Utc::now()));
        Ok(())
    }

    async fn count_usage_since(
        &self,
        key_hash: &ApiKeyHash,
        since: DateTime<Utc>,
    ) -> Result<i64, CredentialError> {
        let usage = self.usage.read().await;
        Ok(usage
            .iter()
            .filter(|(hash, at)| hash == key_hash.as_str() && *at >= since)
            .count() as i64)
    }
}
