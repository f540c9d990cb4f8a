//! Single-slot memoization of the most recent search result.
//!
//! Queries recur unchanged while the user navigates the result list, so the
//! last result is worth keeping; caching more than one query would grow
//! without bound over a long interactive session, so capacity is
//! deliberately 1. The cache is owned by the search session, never shared
//! process-wide.

use crate::search::executor::FuzzySearchResult;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key. `indexed_file_count` doubles as the index-version marker: a
/// partial snapshot always has a smaller count than the completed index, so
/// results computed mid-build are never reused once more files are indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub max_results: usize,
    pub indexed_file_count: usize,
}

/// Single-slot result cache with hit/miss instrumentation.
pub struct QueryResultCache {
    slot: LruCache<CacheKey, FuzzySearchResult>,
    hits: u64,
    misses: u64,
}

impl Default for QueryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryResultCache {
    pub fn new() -> Self {
        Self {
            slot: LruCache::new(NonZeroUsize::new(1).unwrap()),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<FuzzySearchResult> {
        match self.slot.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(result.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a result, unconditionally evicting any previous entry.
    pub fn put(&mut self, key: CacheKey, result: FuzzySearchResult) {
        self.slot.put(key, result);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
