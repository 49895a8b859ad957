//! Name lookup service: cache-first resolution against the origin
//!
//! The read path is read-through/write-through: cache hit short-circuits the
//! origin, a miss queries the origin and populates the cache before
//! responding. Unknown names are cached too, as zero-confidence results, so
//! repeated misses for the same name stop hitting the origin.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::{CacheConfig, LookupConfig};
use crate::domain::lookup::{INameRepository, LookupError, NameLookup};
use crate::infrastructure::cache::CacheLayer;

/// A resolved name plus where it came from
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub result: NameLookup,
    pub cache_hit: bool,
}

/// Result of a batch lookup; `results` preserves input order
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<LookupOutcome>,
    /// Items that failed and were substituted with zero-confidence results
    pub error_count: u32,
    /// Items that reached the origin (for usage accounting)
    pub origin_misses: u32,
}

#[derive(Clone)]
pub struct LookupService {
    cache: Arc<CacheLayer>,
    names: Arc<dyn INameRepository>,
    default_ttl_seconds: i64,
    warm_ttl_seconds: i64,
    warm_top_n: u32,
    batch_chunk_size: usize,
}

impl LookupService {
    pub fn new(
        cache: Arc<CacheLayer>,
        names: Arc<dyn INameRepository>,
        cache_config: &CacheConfig,
        lookup_config: &LookupConfig,
    ) -> Self {
        Self {
            cache,
            names,
            default_ttl_seconds: cache_config.default_ttl_seconds,
            warm_ttl_seconds: cache_config.warm_ttl_seconds,
            warm_top_n: cache_config.warm_top_n,
            batch_chunk_size: lookup_config.batch_chunk_size.max(1),
        }
    }

    fn normalize(name: &str) -> Result<String, LookupError> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LookupError::EmptyName);
        }
        Ok(normalized)
    }

    fn cache_key(name: &str) -> String {
        format!("name:{}", name)
    }

    /// Resolve a single name, cache-first
    pub async fn lookup(&self, name: &str) -> Result<LookupOutcome, LookupError> {
        let normalized = Self::normalize(name)?;
        let key = Self::cache_key(&normalized);

        if let Some(result) = self.cache.get::<NameLookup>(&key).await {
            debug!(name = %normalized, "Lookup served from cache");
            return Ok(LookupOutcome {
                result,
                cache_hit: true,
            });
        }

        let result = match self.names.find(&normalized).await? {
            Some(record) => record.into_lookup(),
            None => NameLookup::unknown(&normalized),
        };

        self.cache
            .set(&key, &result, self.default_ttl_seconds)
            .await;

        Ok(LookupOutcome {
            result,
            cache_hit: false,
        })
    }

    /// Resolve a batch of names, preserving input order.
    ///
    /// Names are resolved in parallel sub-batches so one large request cannot
    /// monopolize origin connections. Per-item failures degrade to
    /// zero-confidence results instead of failing the whole batch.
    pub async fn lookup_batch(&self, names: &[String]) -> BatchOutcome {
        let mut results: Vec<Option<LookupOutcome>> = vec![None; names.len()];
        let mut error_count = 0u32;
        let mut origin_misses = 0u32;

        for (chunk_index, chunk) in names.chunks(self.batch_chunk_size).enumerate() {
            let base = chunk_index * self.batch_chunk_size;
            let mut set = JoinSet::new();

            for (offset, name) in chunk.iter().enumerate() {
                let service = self.clone();
                let name = name.clone();
                set.spawn(async move { (base + offset, name.clone(), service.lookup(&name).await) });
            }

            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((index, _, Ok(outcome))) => {
                        if !outcome.cache_hit {
                            origin_misses += 1;
                        }
                        results[index] = Some(outcome);
                    }
                    Ok((index, name, Err(e))) => {
                        warn!(name = %name, error = %e, "Batch item lookup failed");
                        error_count += 1;
                        results[index] = Some(LookupOutcome {
                            result: NameLookup::unknown(name.trim()),
                            cache_hit: false,
                        });
                    }
                    Err(e) => {
                        // Panicked task; its slot is backfilled below.
                        warn!(error = %e, "Batch lookup task failed to join");
                        error_count += 1;
                    }
                }
            }
        }

        let results = results
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| LookupOutcome {
                    result: NameLookup::unknown(name.trim()),
                    cache_hit: false,
                })
            })
            .collect();

        BatchOutcome {
            results,
            error_count,
            origin_misses,
        }
    }

    /// Preload the hottest records with a long TTL; returns how many were cached
    pub async fn warm_cache(&self) -> Result<u32, LookupError> {
        let records = self.names.find_top(self.warm_top_n).await?;
        let mut warmed = 0u32;

        for record in records {
            let result = record.into_lookup();
            let key = Self::cache_key(&result.name);
            self.cache.set(&key, &result, self.warm_ttl_seconds).await;
            warmed += 1;
        }

        debug!(warmed, "Cache warming completed");
        Ok(warmed)
    }
}
