//! Read-through / write-through composition of the L1 and L2 tiers

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::memory_cache::MemoryCache;
use super::store::CacheStore;
use super::CacheEnvelope;

/// Outcome of a write across the two tiers.
///
/// L1 writes are infallible, so the distinction is whether the durable tier
/// accepted the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWriteStatus {
    /// Both tiers accepted the entry
    Stored,
    /// L1 accepted but L2 failed; entry survives until eviction or restart
    Degraded,
    /// The payload could not be serialized; nothing was written
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub l1_entries: u64,
    pub l2_entries: i64,
}

/// Two-tier cache with a shared key namespace.
///
/// Reads check L1 first, then L2 (promoting hits back into L1). All backend
/// errors are logged and reported as misses; the cache never fails a request.
pub struct CacheLayer {
    prefix: String,
    l1: MemoryCache,
    store: Arc<dyn CacheStore>,
}

impl CacheLayer {
    pub fn new(prefix: impl Into<String>, l1_max_entries: u64, store: Arc<dyn CacheStore>) -> Self {
        Self {
            prefix: prefix.into(),
            l1: MemoryCache::new(l1_max_entries),
            store,
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    fn namespace_prefix(&self) -> String {
        format!("{}:", self.prefix)
    }

    /// Read through both tiers; `None` means miss, expired, or backend error
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.namespaced(key);

        if let Some(envelope) = self.l1.get(&full_key).await {
            match serde_json::from_value(envelope.data.clone()) {
                Ok(value) => return Some(value),
                Err(e) => {
                    tracing::warn!(key = %full_key, error = %e, "Corrupt L1 cache entry, evicting");
                    self.l1.invalidate(&full_key).await;
                }
            }
        }

        match self.store.find_by_key(&full_key).await {
            Ok(Some(envelope)) => {
                if envelope.is_expired() {
                    // Lazy reclamation; background cleanup handles the rest.
                    if let Err(e) = self.store.delete(&full_key).await {
                        tracing::warn!(key = %full_key, error = %e, "Failed to delete expired cache entry");
                    }
                    return None;
                }

                match serde_json::from_value(envelope.data.clone()) {
                    Ok(value) => {
                        self.l1.insert(full_key, envelope).await;
                        Some(value)
                    }
                    Err(e) => {
                        tracing::warn!(key = %full_key, error = %e, "Corrupt L2 cache entry");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "L2 cache read failed");
                None
            }
        }
    }

    /// Write through both tiers. A non-positive TTL stores an already-expired
    /// envelope, which no subsequent read will serve.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: i64) -> CacheWriteStatus {
        let full_key = self.namespaced(key);

        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "Failed to serialize cache payload");
                return CacheWriteStatus::Failed;
            }
        };

        let envelope = CacheEnvelope::new(data, ttl_seconds);
        self.l1.insert(full_key.clone(), envelope.clone()).await;

        match self.store.upsert(&full_key, &envelope).await {
            Ok(()) => CacheWriteStatus::Stored,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "L2 cache write failed, entry held in L1 only");
                CacheWriteStatus::Degraded
            }
        }
    }

    /// Remove a key from both tiers
    pub async fn delete(&self, key: &str) {
        let full_key = self.namespaced(key);
        self.l1.invalidate(&full_key).await;
        if let Err(e) = self.store.delete(&full_key).await {
            tracing::warn!(key = %full_key, error = %e, "L2 cache delete failed");
        }
    }

    /// Drop everything under this layer's namespace; returns L2 rows removed
    pub async fn clear(&self) -> u64 {
        self.l1.clear();
        match self.store.delete_by_prefix(&self.namespace_prefix()).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "L2 cache clear failed");
                0
            }
        }
    }

    /// Reclaim expired entries from both tiers; returns (l1, l2) counts
    pub async fn clean_expired(&self) -> (u64, u64) {
        let l1_removed = self.l1.sweep_expired().await;
        let l2_removed = match self
            .store
            .delete_expired(&self.namespace_prefix(), chrono::Utc::now())
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "L2 expired-entry cleanup failed");
                0
            }
        };
        (l1_removed, l2_removed)
    }

    pub async fn stats(&self) -> CacheStats {
        let l2_entries = match self.store.count(&self.namespace_prefix()).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "L2 cache count failed");
                -1
            }
        };

        CacheStats {
            l1_entries: self.l1.entry_count(),
            l2_entries,
        }
    }
}
