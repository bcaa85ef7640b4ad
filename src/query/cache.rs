//! Query result cache with TTL expiry
//!
//! Memoizes query results under a canonical signature derived from the
//! query's filter and paging parameters. Expiry is checked lazily on
//! access; there is no background sweep. The cache is the one piece of
//! shared mutable state in the crate and is safe under concurrent
//! `try_get`/`set`/`clear` with atomic hit/miss accounting.

use crate::query::{GraphQuery, GraphQueryResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::trace;

/// Errors raised at cache construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("cache TTL must be greater than zero")]
    ZeroTtl,
}

/// Hit/miss accounting for the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// hits / total_requests, 0.0 when no requests were made
    pub hit_rate: f64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: GraphQueryResult,
    inserted_at: Instant,
}

/// TTL cache for query results
///
/// Two structurally identical queries (same type, same filters in any
/// insertion order, same paging) share one entry.
#[derive(Debug)]
pub struct QueryCacheService {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCacheService {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Result<Self, CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::ZeroTtl);
        }
        Ok(Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Look up a cached result for a query
    ///
    /// Hits are returned with `from_cache` set. Expired entries are
    /// removed on access and count as misses.
    pub fn try_get(&self, query: &GraphQuery) -> Option<GraphQueryResult> {
        let key = Self::signature(query);

        let expired = match self.entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut result = entry.result.clone();
                result.from_cache = true;
                trace!(key = %key, "query cache hit");
                return Some(result);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // Re-check under the entry lock so a concurrent refresh is kept.
            let ttl = self.ttl;
            self.entries
                .remove_if(&key, |_, entry| entry.inserted_at.elapsed() >= ttl);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(key = %key, expired, "query cache miss");
        None
    }

    /// Store a result under the query's signature
    pub fn set(&self, query: &GraphQuery, result: GraphQueryResult) {
        let key = Self::signature(query);
        self.entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove all entries unconditionally
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of hit/miss accounting
    pub fn statistics(&self) -> CacheStatistics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total_requests = hits + misses;
        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64
        };
        CacheStatistics {
            hits,
            misses,
            total_requests,
            hit_rate,
        }
    }

    /// Canonical signature for a query
    ///
    /// Filters are keyed in sorted order so insertion order never splits
    /// structurally identical queries into separate entries. The timeout
    /// is deliberately not part of the signature.
    fn signature(query: &GraphQuery) -> String {
        let mut key = format!(
            "type={}",
            query
                .entity_type
                .as_ref()
                .map(|t| t.as_str())
                .unwrap_or("*")
        );
        let sorted: BTreeMap<&String, _> = query.property_filters.iter().collect();
        for (name, value) in sorted {
            key.push_str(&format!("|{}={}", name, value));
        }
        let page = query
            .page_size
            .map(|p| p.to_string())
            .unwrap_or_else(|| "*".to_string());
        key.push_str(&format!("|page={}|skip={}", page, query.skip));
        key
    }
}
