//! Credential value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TierQuotasConfig;

/// Access tier for an API credential.
///
/// Quotas strictly increase from FREE to ENTERPRISE; the concrete values live
/// in configuration so tiers can be retuned without a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl Tier {
    /// Tier name for logging and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "FREE",
            Tier::Basic => "BASIC",
            Tier::Premium => "PREMIUM",
            Tier::Enterprise => "ENTERPRISE",
        }
    }

    /// The hourly quota this tier maps to under the given table
    pub fn requests_per_window(&self, quotas: &TierQuotasConfig) -> u32 {
        match self {
            Tier::Free => quotas.free,
            Tier::Basic => quotas.basic,
            Tier::Premium => quotas.premium,
            Tier::Enterprise => quotas.enterprise,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FREE" => Ok(Tier::Free),
            "BASIC" => Ok(Tier::Basic),
            "PREMIUM" => Ok(Tier::Premium),
            "ENTERPRISE" => Ok(Tier::Enterprise),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// SHA-256 hash of an API key; the plaintext key is never persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyHash(String);

impl ApiKeyHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKeyHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl fmt::Display for ApiKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
