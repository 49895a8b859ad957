//! Persistent L2 cache store backends
//!
//! The store is the durability tier shared across processes. Per-key
//! last-write-wins upserts absorb concurrent writers; no transactions are used
//! for cache operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CacheEnvelope;
use crate::application::errors::CacheStoreError;

/// L2 store interface consumed by the cache layer
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<CacheEnvelope>, CacheStoreError>;

    /// Create-or-replace by key (upsert; last write wins)
    async fn upsert(&self, key: &str, envelope: &CacheEnvelope) -> Result<(), CacheStoreError>;

    /// Idempotent delete
    async fn delete(&self, key: &str) -> Result<(), CacheStoreError>;

    /// Bulk delete of all keys under a prefix; returns rows removed
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError>;

    /// Bulk delete of entries under a prefix that expired before `before`
    async fn delete_expired(
        &self,
        prefix: &str,
        before: DateTime<Utc>,
    ) -> Result<u64, CacheStoreError>;

    /// Number of entries under a prefix
    async fn count(&self, prefix: &str) -> Result<i64, CacheStoreError>;
}

/// Postgres-backed cache store
pub struct SqlxCacheStore {
    pool: Arc<PgPool>,
}

impl SqlxCacheStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for SqlxCacheStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<CacheEnvelope>, CacheStoreError> {
        let row = sqlx::query(
            r#"
            SELECT value, created_at, expires_at
            FROM cache_entries
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| CacheStoreError::Backend {
            message: e.to_string(),
        })?;

        match row {
            Some(row) => {
                let data: serde_json::Value =
                    row.try_get("value").map_err(|e| CacheStoreError::Backend {
                        message: e.to_string(),
                    })?;
                let created_at: DateTime<Utc> =
                    row.try_get("created_at")
                        .map_err(|e| CacheStoreError::Backend {
                            message: e.to_string(),
                        })?;
                let expires_at: DateTime<Utc> =
                    row.try_get("expires_at")
                        .map_err(|e| CacheStoreError::Backend {
                            message: e.to_string(),
                        })?;

                Ok(Some(CacheEnvelope {
                    data,
                    created_at,
                    expires_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, key: &str, envelope: &CacheEnvelope) -> Result<(), CacheStoreError> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(&envelope.data)
        .bind(envelope.created_at)
        .bind(envelope.expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| CacheStoreError::Backend {
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(&*self.pool)
            .await
            .map_err(|e| CacheStoreError::Backend {
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let pattern = format!("{}%", prefix);
        let result = sqlx::query("DELETE FROM cache_entries WHERE key LIKE $1")
            .bind(&pattern)
            .execute(&*self.pool)
            .await
            .map_err(|e| CacheStoreError::Backend {
                message: e.to_string(),
            })?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(
        &self,
        prefix: &str,
        before: DateTime<Utc>,
    ) -> Result<u64, CacheStoreError> {
        let pattern = format!("{}%", prefix);
        let result = sqlx::query("DELETE FROM cache_entries WHERE key LIKE $1 AND expires_at <= $2")
            .bind(&pattern)
            .bind(before)
            .execute(&*self.pool)
            .await
            .map_err(|e| CacheStoreError::Backend {
                message: e.to_string(),
            })?;

        Ok(result.rows_affected())
    }

    async fn count(&self, prefix: &str) -> Result<i64, CacheStoreError> {
        let pattern = format!("{}%", prefix);
        let row = sqlx::query("SELECT COUNT(*) AS total FROM cache_entries WHERE key LIKE $1")
            .bind(&pattern)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| CacheStoreError::Backend {
                message: e.to_string(),
            })?;

        row.try_get("total").map_err(|e| CacheStoreError::Backend {
            message: e.to_string(),
        })
    }
}

/// In-memory cache store for development and single-instance deployments
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEnvelope>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<CacheEnvelope>, CacheStoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn upsert(&self, key: &str, envelope: &CacheEnvelope) -> Result<(), CacheStoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), envelope.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheStoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn delete_expired(
        &self,
        prefix: &str,
        before: DateTime<Utc>,
    ) -> Result<u64, CacheStoreError> {
        let mut entries = self.entries.write().await;
        let len_before = entries.len();
        entries.retain(|key, envelope| !(key.starts_with(prefix) && envelope.expires_at <= before));
        Ok((len_before - entries.len()) as u64)
    }

    async fn count(&self, prefix: &str) -> Result<i64, CacheStoreError> {
        let entries = self.entries.read().await;
        Ok(entries.keys().filter(|k| k.starts_with(prefix)).count() as i64)
    }
}
