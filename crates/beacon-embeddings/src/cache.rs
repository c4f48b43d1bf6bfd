//! QueryEmbeddingCache: normalized query text → vector with a TTL.
//!
//! Expiry is checked on read against the injected clock; there is no
//! background eviction and no size bound. Growth is proportional to the
//! number of distinct questions asked within the process lifetime, which is
//! accepted for a single portal instance. `purge_expired` exists for callers
//! that want to reclaim memory periodically.

use std::sync::Arc;

use beacon_core::clock::Clock;
use beacon_core::errors::BeaconResult;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::generator::EmbeddingGenerator;

#[derive(Debug, Clone)]
struct CacheEntry {
    vector: Vec<f32>,
    created_at: DateTime<Utc>,
}

pub struct QueryEmbeddingCache {
    generator: Arc<EmbeddingGenerator>,
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl QueryEmbeddingCache {
    pub fn new(generator: Arc<EmbeddingGenerator>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            generator,
            entries: DashMap::new(),
            clock,
            ttl,
        }
    }

    /// Cache key: trimmed, lower-cased query.
    pub fn normalize(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Vector for `query`, computed at most once per TTL window.
    ///
    /// Failures are returned and not cached. Two concurrent misses on the same
    /// key may both call the embedding function; the later write wins.
    pub async fn get(&self, query: &str) -> BeaconResult<Vec<f32>> {
        let key = Self::normalize(query);
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(&key) {
            if now - entry.created_at < self.ttl {
                debug!(query_len = key.len(), "query embedding cache hit");
                return Ok(entry.vector.clone());
            }
        }

        debug!(query_len = key.len(), "query embedding cache miss");
        let vector = self.generator.embed_text(&key).await?;
        self.entries.insert(
            key,
            CacheEntry {
                vector: vector.clone(),
                created_at: self.clock.now(),
            },
        );
        Ok(vector)
    }

    /// Whether a fresh entry exists for `query`. Does not call out.
    pub fn contains_fresh(&self, query: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(&Self::normalize(query))
            .is_some_and(|e| now - e.created_at < self.ttl)
    }

    /// Entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.created_at < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
