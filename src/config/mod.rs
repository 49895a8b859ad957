//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
    pub lookup: LookupConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Global request timeout; the pipeline is aborted past this point
    pub request_timeout_seconds: u64,
    pub shutdown_timeout_seconds: u64,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 10,
            shutdown_timeout_seconds: 5,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connect_timeout_seconds: 10,
        }
    }
}

/// Storage backend for the L2 cache tier
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheStorageBackend {
    /// Persist cache entries in Postgres (survives process restarts)
    #[default]
    Postgres,
    /// In-memory L2 (suitable for development/single instance)
    Memory,
}

/// Layered cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace prefix applied to every key before touching either tier
    pub key_prefix: String,
    pub storage_backend: CacheStorageBackend,
    /// TTL for entries populated on a cache miss
    pub default_ttl_seconds: i64,
    /// TTL for entries populated by cache warming
    pub warm_ttl_seconds: i64,
    /// How many top-popularity records cache warming preloads
    pub warm_top_n: u32,
    /// L1 capacity in entries
    pub l1_max_entries: u64,
    /// Interval between expired-entry sweeps
    pub clean_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "namelens".to_string(),
            storage_backend: CacheStorageBackend::Postgres,
            default_ttl_seconds: 3600,
            warm_ttl_seconds: 24 * 3600,
            warm_top_n: 500,
            l1_max_entries: 10_000,
            clean_interval_seconds: 600,
        }
    }
}

/// Per-tier hourly quotas.
///
/// These are the quotas captured into a credential at issuance time. Changing
/// them later does not retroactively change already-issued keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierQuotasConfig {
    pub free: u32,
    pub basic: u32,
    pub premium: u32,
    pub enterprise: u32,
}

impl Default for TierQuotasConfig {
    fn default() -> Self {
        Self {
            free: 100,
            basic: 1_000,
            premium: 10_000,
            enterprise: 100_000,
        }
    }
}

/// Fixed-window rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Window length; counts reset sharply at the window boundary
    pub window_seconds: u64,
    /// Interval between cleanup sweeps of lapsed counters
    pub cleanup_interval_seconds: u64,
    pub tiers: TierQuotasConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: 3600,
            cleanup_interval_seconds: 300,
            tiers: TierQuotasConfig::default(),
        }
    }
}

/// API credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Prefix for generated API keys (e.g. "nl_")
    pub key_prefix: String,
    /// Random payload length of generated keys in bytes (hex-encoded, so 2x chars)
    pub key_length: usize,
    /// Lookback window for the secondary per-credential usage quota
    pub usage_lookback_seconds: i64,
    /// Shared secret gating the admin endpoints; None disables them
    pub admin_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key_prefix: "nl_".to_string(),
            key_length: 32,
            usage_lookback_seconds: 3600,
            admin_key: None,
        }
    }
}

/// Lookup pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Maximum names accepted in one batch request
    pub max_batch_size: usize,
    /// Origin lookups run in parallel sub-batches of this size
    pub batch_chunk_size: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            batch_chunk_size: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Sources, lowest to highest priority: `config/default`, `config/{ENV}`,
    /// `config/local`, then `NAMELENS__`-prefixed environment variables with
    /// `__` as the section separator.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("NAMELENS").separator("__"));

        let mut config: Config = builder.build()?.try_deserialize()?;

        // DATABASE_URL is the common convention; let it win when present
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            config.database.url = database_url;
        }

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_tier_quotas_strictly_increase() {
        let tiers = TierQuotasConfig::default();
        assert!(tiers.free < tiers.basic);
        assert!(tiers.basic < tiers.premium);
        assert!(tiers.premium < tiers.enterprise);
    }
}
