//! Credential infrastructure: key generation and repository implementations

pub mod api_key_generator;
pub mod credential_repository;

pub use api_key_generator::ApiKeyGenerator;
pub use credential_repository::{InMemoryCredentialRepository, SqlxCredentialRepository};
