//! Rate limit counter storage backends

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::FixedWindowState;

/// Trait for rate limit counter storage backends
#[async_trait]
pub trait RateCounterStorage: Send + Sync {
    /// Get fixed window state
    async fn get_window(&self, key: &str) -> Result<Option<FixedWindowState>, String>;

    /// Set fixed window state with TTL
    async fn set_window(
        &self,
        key: &str,
        state: &FixedWindowState,
        ttl_secs: u64,
    ) -> Result<(), String>;

    /// Delete a key
    async fn delete(&self, key: &str) -> Result<(), String>;

    /// Cleanup expired entries
    async fn cleanup(&self);
}

/// In-memory storage entry with expiration
#[derive(Clone)]
struct MemoryEntry {
    value: FixedWindowState,
    expires_at: u64,
}

/// In-memory counter storage for development/single instance
pub struct InMemoryCounterStorage {
    windows: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl InMemoryCounterStorage {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn current_time() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

impl Default for InMemoryCounterStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateCounterStorage for InMemoryCounterStorage {
    async fn get_window(&self, key: &str) -> Result<Option<FixedWindowState>, String> {
        let windows = self.windows.read().await;
        if let Some(entry) = windows.get(key)
            && Self::current_time() < entry.expires_at
        {
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set_window(
        &self,
        key: &str,
        state: &FixedWindowState,
        ttl_secs: u64,
    ) -> Result<(), String> {
        let mut windows = self.windows.write().await;
        windows.insert(
            key.to_string(),
            MemoryEntry {
                value: state.clone(),
                expires_at: Self::current_time() + ttl_secs,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        let mut windows = self.windows.write().await;
        windows.remove(key);
        Ok(())
    }

    async fn cleanup(&self) {
        let now = Self::current_time();
        let mut windows = self.windows.write().await;
        windows.retain(|_, entry| entry.expires_at > now);
        debug!("Completed rate limit counter cleanup");
    }
}
