//! Origin lookup interface

use async_trait::async_trait;

use super::entities::NameRecord;
use super::errors::LookupError;

/// Origin data source for name records. Stateless, idempotent, side-effect-free.
#[async_trait]
pub trait INameRepository: Send + Sync {
    /// Find a record by exact (normalized) name
    async fn find(&self, name: &str) -> Result<Option<NameRecord>, LookupError>;

    /// Top `n` records by popularity, used by cache warming
    async fn find_top(&self, n: u32) -> Result<Vec<NameRecord>, LookupError>;
}
