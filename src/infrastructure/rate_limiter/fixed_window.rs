//! Fixed window rate limiter
//!
//! Counts requests per key in non-overlapping windows of fixed length. A
//! window rolls over when its start is more than `window_seconds` in the
//! past; the first hit after rollover starts a fresh window with count 1.
//! Storage failures fail open so the limiter never takes the API down.

use std::sync::Arc;
use tracing::warn;

use super::storage::RateCounterStorage;
use super::types::{FixedWindowState, RateLimitKey, RateLimitResult, current_time_secs};

pub struct FixedWindowLimiter {
    storage: Arc<dyn RateCounterStorage>,
    key_prefix: String,
    window_seconds: u64,
}

impl FixedWindowLimiter {
    pub fn new(
        storage: Arc<dyn RateCounterStorage>,
        key_prefix: impl Into<String>,
        window_seconds: u64,
    ) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
            window_seconds,
        }
    }

    /// Count a hit against `key` and decide admission.
    ///
    /// Blocked hits are still counted, so a blocked caller does not regain
    /// budget until the window rolls over.
    pub async fn check_and_increment(&self, key: &RateLimitKey, limit: u32) -> RateLimitResult {
        let storage_key = key.to_storage_key(&self.key_prefix);
        let now = current_time_secs();

        let state = match self.storage.get_window(&storage_key).await {
            Ok(state) => state,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Rate limit storage read failed, allowing request");
                return RateLimitResult::allowed(limit, limit, now + self.window_seconds);
            }
        };

        let mut state = match state {
            Some(state) if now < state.window_start + self.window_seconds => state,
            // Missing or rolled-over window starts fresh.
            _ => FixedWindowState {
                count: 0,
                window_start: now,
            },
        };

        state.count = state.count.saturating_add(1);
        let reset_at = state.window_start + self.window_seconds;

        // Counter entries outlive the window they describe so decrements
        // shortly after rollover still find them.
        if let Err(e) = self
            .storage
            .set_window(&storage_key, &state, self.window_seconds * 2)
            .await
        {
            warn!(key = %storage_key, error = %e, "Rate limit storage write failed, allowing request");
            return RateLimitResult::allowed(limit, limit.saturating_sub(state.count), reset_at);
        }

        if state.count <= limit {
            RateLimitResult::allowed(limit, limit - state.count, reset_at)
        } else {
            RateLimitResult::blocked(limit, reset_at, reset_at.saturating_sub(now))
        }
    }

    /// Refund one hit, e.g. when a counted request is rejected before doing
    /// any work. Floors at zero and never un-rolls a window.
    pub async fn decrement(&self, key: &RateLimitKey) {
        let storage_key = key.to_storage_key(&self.key_prefix);

        let state = match self.storage.get_window(&storage_key).await {
            Ok(Some(state)) => state,
            Ok(None) => return,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Rate limit storage read failed, skipping refund");
                return;
            }
        };

        let refunded = FixedWindowState {
            count: state.count.saturating_sub(1),
            window_start: state.window_start,
        };

        if let Err(e) = self
            .storage
            .set_window(&storage_key, &refunded, self.window_seconds * 2)
            .await
        {
            warn!(key = %storage_key, error = %e, "Rate limit storage write failed, refund lost");
        }
    }

    /// Drop all counter state for a key (admin operation)
    pub async fn reset(&self, key: &RateLimitKey) -> Result<(), String> {
        let storage_key = key.to_storage_key(&self.key_prefix);
        self.storage.delete(&storage_key).await
    }

    /// Reclaim expired counter entries
    pub async fn cleanup(&self) {
        self.storage.cleanup().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rate_limiter::storage::InMemoryCounterStorage;
    use async_trait::async_trait;

    struct FailingStorage;

    #[async_trait]
    impl RateCounterStorage for FailingStorage {
        async fn get_window(&self, _key: &str) -> Result<Option<FixedWindowState>, String> {
            Err("storage down".to_string())
        }

        async fn set_window(
            &self,
            _key: &str,
            _state: &FixedWindowState,
            _ttl_secs: u64,
        ) -> Result<(), String> {
            Err("storage down".to_string())
        }

        async fn delete(&self, _key: &str) -> Result<(), String> {
            Err("storage down".to_string())
        }

        async fn cleanup(&self) {}
    }

    fn limiter(window_seconds: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(
            Arc::new(InMemoryCounterStorage::new()),
            "ratelimit",
            window_seconds,
        )
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let limiter = limiter(3600);
        let key = RateLimitKey::ApiKey("hash".to_string());

        for i in 0..3 {
            let result = limiter.check_and_increment(&key, 3).await;
            assert!(result.allowed, "request {} should be allowed", i + 1);
            assert_eq!(result.remaining, 2 - i);
        }

        let result = limiter.check_and_increment(&key, 3).await;
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.retry_after.is_some());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(3600);
        let a = RateLimitKey::ApiKey("a".to_string());
        let b = RateLimitKey::Ip("10.0.0.1".to_string());

        assert!(limiter.check_and_increment(&a, 1).await.allowed);
        assert!(!limiter.check_and_increment(&a, 1).await.allowed);
        assert!(limiter.check_and_increment(&b, 1).await.allowed);
    }

    #[tokio::test]
    async fn test_window_rollover_resets_count() {
        let limiter = limiter(1);
        let key = RateLimitKey::Ip("10.0.0.1".to_string());

        assert!(limiter.check_and_increment(&key, 1).await.allowed);
        assert!(!limiter.check_and_increment(&key, 1).await.allowed);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let result = limiter.check_and_increment(&key, 1).await;
        assert!(result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[tokio::test]
    async fn test_decrement_refunds_budget() {
        let limiter = limiter(3600);
        let key = RateLimitKey::ApiKey("hash".to_string());

        assert!(limiter.check_and_increment(&key, 1).await.allowed);
        assert!(!limiter.check_and_increment(&key, 1).await.allowed);

        // Two refunds: the blocked hit and the counted one.
        limiter.decrement(&key).await;
        limiter.decrement(&key).await;

        assert!(limiter.check_and_increment(&key, 1).await.allowed);
    }

    #[tokio::test]
    async fn test_saturated_counter_keeps_blocking() {
        let storage = Arc::new(InMemoryCounterStorage::new());
        let limiter = FixedWindowLimiter::new(storage.clone(), "ratelimit", 3600);
        let key = RateLimitKey::ApiKey("hot".to_string());

        // A counter hammered to the top of its range must not wrap around.
        let state = FixedWindowState {
            count: u32::MAX,
            window_start: current_time_secs(),
        };
        storage
            .set_window(&key.to_storage_key("ratelimit"), &state, 7200)
            .await
            .unwrap();

        let result = limiter.check_and_increment(&key, 100).await;
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[tokio::test]
    async fn test_decrement_on_missing_key_is_noop() {
        let limiter = limiter(3600);
        limiter.decrement(&RateLimitKey::Ip("nope".to_string())).await;
    }

    #[tokio::test]
    async fn test_reset_clears_counter() {
        let limiter = limiter(3600);
        let key = RateLimitKey::ApiKey("hash".to_string());

        assert!(limiter.check_and_increment(&key, 1).await.allowed);
        assert!(!limiter.check_and_increment(&key, 1).await.allowed);

        limiter.reset(&key).await.unwrap();

        assert!(limiter.check_and_increment(&key, 1).await.allowed);
    }

    #[tokio::test]
    async fn test_storage_failure_fails_open() {
        let limiter = FixedWindowLimiter::new(Arc::new(FailingStorage), "ratelimit", 3600);
        let key = RateLimitKey::Ip("10.0.0.1".to_string());

        let result = limiter.check_and_increment(&key, 1).await;
        assert!(result.allowed);
    }
}
