//! In-memory L1 cache tier using moka

use moka::future::Cache;
use std::sync::Arc;

use super::CacheEnvelope;

/// In-process L1 tier.
///
/// Losing L1 never loses correctness, only performance; L2 is the source of
/// truth across process restarts. Capacity eviction is moka's concern; logical
/// expiry is checked lazily against the envelope.
pub struct MemoryCache {
    cache: Cache<String, Arc<CacheEnvelope>>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Get a live envelope; expired entries are evicted and reported absent
    pub async fn get(&self, key: &str) -> Option<Arc<CacheEnvelope>> {
        match self.cache.get(key).await {
            Some(envelope) if !envelope.is_expired() => Some(envelope),
            Some(_) => {
                self.cache.invalidate(key).await;
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: String, envelope: CacheEnvelope) {
        self.cache.insert(key, Arc::new(envelope)).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Sweep entries whose expiry has passed; returns how many were removed
    pub async fn sweep_expired(&self) -> u64 {
        let expired: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, envelope)| envelope.is_expired())
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let removed = expired.len() as u64;
        for key in expired {
            self.cache.invalidate(&key).await;
        }
        removed
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = MemoryCache::new(100);
        let envelope = CacheEnvelope::new(serde_json::json!("value"), 60);
        cache.insert("k".to_string(), envelope).await;

        let hit = cache.get("k").await;
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().data, serde_json::json!("value"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = MemoryCache::new(100);
        let envelope = CacheEnvelope::new(serde_json::json!("value"), -1);
        cache.insert("k".to_string(), envelope).await;

        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let cache = MemoryCache::new(100);
        cache
            .insert("dead".to_string(), CacheEnvelope::new(serde_json::json!(1), -1))
            .await;
        cache
            .insert("live".to_string(), CacheEnvelope::new(serde_json::json!(2), 60))
            .await;
        cache.cache.run_pending_tasks().await;

        let removed = cache.sweep_expired().await;
        assert_eq!(removed, 1);
        assert!(cache.get("live").await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = MemoryCache::new(100);
        cache.invalidate("absent").await;
        assert!(cache.get("absent").await.is_none());
    }
}
