//! Application layer error types

use thiserror::Error;

use crate::domain::credential::CredentialError;
use crate::domain::lookup::LookupError;

/// L2 cache store errors
#[derive(Error, Debug, Clone)]
pub enum CacheStoreError {
    #[error("Cache backend error: {message}")]
    Backend { message: String },
}

/// Top-level application error type.
///
/// Rate-limit and timeout rejections never reach this type; they are produced
/// directly by the admission and timeout middleware. Cache failures are
/// swallowed inside the cache layer.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}
