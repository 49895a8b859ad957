//! Credential domain errors

use thiserror::Error;

/// Credential-specific domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CredentialError {
    #[error("API key not found")]
    NotFound,

    #[error("API key is inactive")]
    Inactive,

    #[error("API key usage quota exhausted")]
    QuotaExceeded,

    #[error("Invalid tier: {tier}")]
    InvalidTier { tier: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}
