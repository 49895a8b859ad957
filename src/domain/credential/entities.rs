//! Credential domain entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{ApiKeyHash, Tier};

/// API credential aggregate root.
///
/// `request_limit` is captured from the tier table at issuance time; it is
/// allowed to drift from the live table afterwards unless explicitly updated.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    pub id: Uuid,
    /// Hashed API key (never expose or store the raw key)
    pub key_hash: ApiKeyHash,
    /// Human-readable label for the credential
    pub name: String,
    pub tier: Tier,
    /// Hourly quota captured at issuance
    pub request_limit: u32,
    /// Inactive credentials are always rejected regardless of quota state
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiCredential {
    /// Create a new active credential, capturing the tier's current quota
    pub fn new(key_hash: ApiKeyHash, name: String, tier: Tier, request_limit: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            key_hash,
            name,
            tier,
            request_limit,
            is_active: true,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn mark_as_used(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}
