//! Request and response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::credential::Tier;
use crate::domain::lookup::{Gender, NameLookup};

/// Standard error envelope returned by every failure path
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// A single resolved name
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub name: String,
    pub gender: Gender,
    pub english_name: Option<String>,
    pub confidence: f32,
    /// Whether this result was served from the cache
    pub cached: bool,
}

impl LookupResponse {
    pub fn from_lookup(lookup: NameLookup, cached: bool) -> Self {
        Self {
            name: lookup.name,
            gender: lookup.gender,
            english_name: lookup.english_name,
            confidence: lookup.confidence,
            cached,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLookupRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLookupResponse {
    /// One result per input name, in input order
    pub results: Vec<LookupResponse>,
    /// Items that failed and degraded to zero-confidence results
    pub error_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    pub tier: Tier,
}

/// Issued key response; `api_key` is the only time the plaintext is exposed
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub api_key: String,
    pub masked_key: String,
    pub tier: Tier,
    pub request_limit: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeactivateApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub l1_entries: u64,
    /// -1 when the persistent tier could not be counted
    pub l2_entries: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WarmCacheResponse {
    pub warmed: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub removed: u64,
}

/// Reset a rate limit counter for exactly one of the two key kinds
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetRateLimitRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
