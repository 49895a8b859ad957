//! API credential domain: tiers, entities, and repository interface

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use entities::ApiCredential;
pub use errors::CredentialError;
pub use repositories::ICredentialRepository;
pub use value_objects::{ApiKeyHash, Tier};
