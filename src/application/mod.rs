//! Application layer: use cases orchestrating the domain and infrastructure

pub mod credential;
pub mod errors;
pub mod lookup;

pub use errors::{ApplicationError, CacheStoreError};
