//! Test data factories

use std::sync::Arc;

use namelens::application::lookup::LookupService;
use namelens::config::{CacheConfig, LookupConfig};
use namelens::domain::lookup::{Gender, INameRepository, NameRecord};
use namelens::infrastructure::cache::{CacheLayer, InMemoryCacheStore};

/// Factory for creating NameRecord instances
pub struct NameRecordFactory;

impl NameRecordFactory {
    pub fn male(name: &str, english: &str, popularity: i64) -> NameRecord {
        NameRecord {
            name: name.to_string(),
            gender: Gender::Male,
            english_name: Some(english.to_string()),
            popularity,
        }
    }

    pub fn female(name: &str, english: &str, popularity: i64) -> NameRecord {
        NameRecord {
            name: name.to_string(),
            gender: Gender::Female,
            english_name: Some(english.to_string()),
            popularity,
        }
    }

    /// A small representative dataset
    pub fn sample_records() -> Vec<NameRecord> {
        vec![
            Self::male("ali", "ali", 950),
            Self::female("sara", "sara", 900),
            Self::male("hassan", "hassan", 700),
            Self::female("maryam", "maryam", 850),
        ]
    }
}

/// Build a lookup service over an in-memory cache and the given origin
pub fn lookup_service(origin: Arc<dyn INameRepository>) -> LookupService {
    let cache = Arc::new(CacheLayer::new(
        "test",
        1_000,
        Arc::new(InMemoryCacheStore::new()),
    ));
    LookupService::new(
        cache,
        origin,
        &CacheConfig::default(),
        &LookupConfig::default(),
    )
}
