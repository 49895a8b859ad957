//! Rate limiter types and core data structures

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Key used to identify rate limit counters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateLimitKey {
    /// Counted per API key hash (authenticated callers)
    ApiKey(String),
    /// Counted per client IP (anonymous callers)
    Ip(String),
}

impl RateLimitKey {
    /// Convert to a storage key string
    pub fn to_storage_key(&self, prefix: &str) -> String {
        match self {
            RateLimitKey::ApiKey(hash) => format!("{}:apikey:{}", prefix, hash),
            RateLimitKey::Ip(ip) => format!("{}:ip:{}", prefix, ip),
        }
    }
}

/// Fixed window counter state for a single key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedWindowState {
    /// Requests counted in the current window
    pub count: u32,
    /// Start of the current window (Unix timestamp in seconds)
    pub window_start: u64,
}

impl FixedWindowState {
    pub fn new() -> Self {
        Self {
            count: 0,
            window_start: current_time_secs(),
        }
    }
}

impl Default for FixedWindowState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Unix timestamp when the window resets
    pub reset_at: u64,
    /// Retry-After duration in seconds (only set when blocked)
    pub retry_after: Option<u64>,
}

impl RateLimitResult {
    pub fn allowed(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            reset_at,
            retry_after: None,
        }
    }

    pub fn blocked(limit: u32, reset_at: u64, retry_after: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset_at,
            retry_after: Some(retry_after),
        }
    }
}

/// Get current time in seconds since Unix epoch
pub fn current_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key_to_storage_key() {
        let ip_key = RateLimitKey::Ip("192.168.1.1".to_string());
        assert_eq!(
            ip_key.to_storage_key("ratelimit"),
            "ratelimit:ip:192.168.1.1"
        );

        let api_key = RateLimitKey::ApiKey("abc123".to_string());
        assert_eq!(
            api_key.to_storage_key("ratelimit"),
            "ratelimit:apikey:abc123"
        );
    }

    #[test]
    fn test_rate_limit_result_allowed() {
        let result = RateLimitResult::allowed(100, 50, 1234567890);
        assert!(result.allowed);
        assert_eq!(result.limit, 100);
        assert_eq!(result.remaining, 50);
        assert!(result.retry_after.is_none());
    }

    #[test]
    fn test_rate_limit_result_blocked() {
        let result = RateLimitResult::blocked(100, 1234567890, 60);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert_eq!(result.retry_after, Some(60));
    }
}
