//! Lookup domain errors

use thiserror::Error;

/// Origin lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Origin storage error: {message}")]
    Storage { message: String },

    #[error("Empty name")]
    EmptyName,
}
