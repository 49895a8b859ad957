//! Shared mock implementations for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use namelens::domain::lookup::{INameRepository, LookupError, NameRecord};

/// Mock origin repository with configurable records, latency, and failure mode
pub struct MockNameRepository {
    records: Vec<NameRecord>,
    should_fail: bool,
    delay: Option<Duration>,
    find_calls: AtomicU32,
}

impl MockNameRepository {
    pub fn new(records: Vec<NameRecord>) -> Self {
        Self {
            records,
            should_fail: false,
            delay: None,
            find_calls: AtomicU32::new(0),
        }
    }

    /// Create a mock origin that always fails
    pub fn failing() -> Self {
        Self {
            records: vec![],
            should_fail: true,
            delay: None,
            find_calls: AtomicU32::new(0),
        }
    }

    /// Create a mock origin that stalls every lookup by `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            records: vec![],
            should_fail: false,
            delay: Some(delay),
            find_calls: AtomicU32::new(0),
        }
    }

    /// Number of `find` calls that reached this origin
    pub fn find_calls(&self) -> u32 {
        self.find_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl INameRepository for MockNameRepository {
    async fn find(&self, name: &str) -> Result<Option<NameRecord>, LookupError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(LookupError::Storage {
                message: "mock origin failure".to_string(),
            });
        }

        Ok(self.records.iter().find(|r| r.name == name).cloned())
    }

    async fn find_top(&self, n: u32) -> Result<Vec<NameRecord>, LookupError> {
        if self.should_fail {
            return Err(LookupError::Storage {
                message: "mock origin failure".to_string(),
            });
        }

        let mut sorted = self.records.clone();
        sorted.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        sorted.truncate(n as usize);
        Ok(sorted)
    }
}
