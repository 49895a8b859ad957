//! Two-tier cache: in-process L1 backed by a persistent L2 store
//!
//! The cache is an optimization layer, never a correctness dependency: every
//! backend failure is swallowed and logged, and callers always get a
//! well-defined hit or miss.

pub mod layered;
pub mod memory_cache;
pub mod store;

pub use layered::{CacheLayer, CacheStats, CacheWriteStatus};
pub use memory_cache::MemoryCache;
pub use store::{CacheStore, InMemoryCacheStore, SqlxCacheStore};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stored value wrapper carrying expiry metadata, shared by both tiers.
///
/// Expiry is checked lazily on read; an envelope past `expires_at` is never
/// served even if still physically present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEnvelope {
    /// Wrap a payload with `expires_at = now + ttl_seconds`.
    ///
    /// A non-positive TTL produces an already-expired envelope.
    pub fn new(data: serde_json::Value, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            data,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_positive_ttl_is_live() {
        let env = CacheEnvelope::new(serde_json::json!({"a": 1}), 60);
        assert!(!env.is_expired());
    }

    #[test]
    fn test_envelope_with_negative_ttl_is_expired() {
        let env = CacheEnvelope::new(serde_json::json!({"a": 1}), -1);
        assert!(env.is_expired());
    }
}
