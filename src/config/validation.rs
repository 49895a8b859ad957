//! Configuration validation module

use crate::config::{
    AuthConfig, CacheConfig, Config, DatabaseConfig, LookupConfig, RateLimitConfig, ServerConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Cache configuration error: {message}")]
    Cache { message: String },

    #[error("Rate limit configuration error: {message}")]
    RateLimit { message: String },

    #[error("Authentication configuration error: {message}")]
    Auth { message: String },

    #[error("Database configuration error: {message}")]
    Database { message: String },

    #[error("Lookup configuration error: {message}")]
    Lookup { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::server("Port must be in range 1-65535"));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.key_prefix.is_empty() {
            return Err(ValidationError::cache("Key prefix cannot be empty"));
        }

        if self.default_ttl_seconds <= 0 {
            return Err(ValidationError::cache(
                "Default TTL must be greater than 0",
            ));
        }

        if self.warm_ttl_seconds < self.default_ttl_seconds {
            return Err(ValidationError::cache(
                "Warm TTL must be at least the default TTL",
            ));
        }

        if self.l1_max_entries == 0 {
            return Err(ValidationError::cache(
                "L1 capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.window_seconds == 0 {
            return Err(ValidationError::rate_limit(
                "Window length must be greater than 0",
            ));
        }

        let t = &self.tiers;
        if !(t.free < t.basic && t.basic < t.premium && t.premium < t.enterprise) {
            return Err(ValidationError::rate_limit(
                "Tier quotas must strictly increase: free < basic < premium < enterprise",
            ));
        }

        Ok(())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.key_length < 16 {
            return Err(ValidationError::auth(
                "API key length must be at least 16 bytes",
            ));
        }

        if self.usage_lookback_seconds <= 0 {
            return Err(ValidationError::auth(
                "Usage lookback must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections == 0 {
            return Err(ValidationError::database(
                "Max connections must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for LookupConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_batch_size == 0 {
            return Err(ValidationError::lookup(
                "Max batch size must be greater than 0",
            ));
        }

        if self.batch_chunk_size == 0 || self.batch_chunk_size > self.max_batch_size {
            return Err(ValidationError::lookup(
                "Batch chunk size must be in range 1..=max_batch_size",
            ));
        }

        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.cache.validate()?;
        self.rate_limit.validate()?;
        self.auth.validate()?;
        self.database.validate()?;
        self.lookup.validate()?;
        Ok(())
    }
}
