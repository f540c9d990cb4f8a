//! Index lifecycle state machine and the search session that drives it.
//!
//! The host scheduler (TUI event loop, one-shot driver, tests) calls
//! [`FuzzyFinder::step`] once per turn; each step does one bounded unit of
//! work and returns. States move strictly forward:
//!
//! `Empty` -> `Downloading` -> `Indexing` (self-loops) -> `Ready` | `Failed`
//!
//! with one shortcut: a persistent-cache hit in `Empty` starts the build
//! immediately, skipping `Downloading`. `Ready` and `Failed` are terminal
//! for a given filename snapshot; a new snapshot means a new `FuzzyFinder`.

use crate::index::builder::{begin_build_with, BuildStep, IndexerConfig, IndexingProgress};
use crate::index::fuzzy::FuzzyIndex;
use crate::search::cache::{CacheKey, QueryResultCache};
use crate::search::executor::{FuzzySearchResult, FuzzySearcher};
use crate::search::scorer::ScoringWeights;
use crate::source::{FilenameSource, PersistentCache};

/// Lifecycle state. Exactly one variant is active; every consumer matches
/// exhaustively, so an illegal combination (ready while indexing, etc.) is
/// unrepresentable.
pub enum FsmState {
    /// No data yet; next step consults the persistent cache
    Empty,
    /// Next step fetches from the filename source
    Downloading,
    /// Partial index; re-entered every turn until the build completes
    Indexing(IndexingProgress),
    /// Terminal success: complete index, queryable
    Ready(FuzzyIndex),
    /// Terminal error with a human-readable message
    Failed(String),
}

/// Discriminant-only view of [`FsmState`] for display and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmStateKind {
    Empty,
    Downloading,
    Indexing,
    Ready,
    Failed,
}

/// One fuzzy-finder session: the FSM, its collaborators, the searcher
/// scratch, and the single-slot result cache. Created per search session
/// and discarded with it.
pub struct FuzzyFinder {
    state: FsmState,
    source: Box<dyn FilenameSource>,
    cache: Box<dyn PersistentCache>,
    cache_key: String,
    config: IndexerConfig,
    searcher: FuzzySearcher,
    results: QueryResultCache,
}

impl FuzzyFinder {
    pub fn new(
        source: Box<dyn FilenameSource>,
        cache: Box<dyn PersistentCache>,
        cache_key: String,
    ) -> Self {
        Self::with_config(
            source,
            cache,
            cache_key,
            IndexerConfig::default(),
            ScoringWeights::default(),
        )
    }

    pub fn with_config(
        source: Box<dyn FilenameSource>,
        cache: Box<dyn PersistentCache>,
        cache_key: String,
        config: IndexerConfig,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            state: FsmState::Empty,
            source,
            cache,
            cache_key,
            config,
            searcher: FuzzySearcher::with_weights(weights),
            results: QueryResultCache::new(),
        }
    }

    pub fn state(&self) -> &FsmState {
        &self.state
    }

    pub fn state_kind(&self) -> FsmStateKind {
        match self.state {
            FsmState::Empty => FsmStateKind::Empty,
            FsmState::Downloading => FsmStateKind::Downloading,
            FsmState::Indexing(_) => FsmStateKind::Indexing,
            FsmState::Ready(_) => FsmStateKind::Ready,
            FsmState::Failed(_) => FsmStateKind::Failed,
        }
    }

    /// True once the lifecycle can make no further progress
    pub fn is_settled(&self) -> bool {
        matches!(self.state, FsmState::Ready(_) | FsmState::Failed(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            FsmState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// `(indexed, total)` while a build is in flight
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.state {
            FsmState::Indexing(p) => Some((p.indexed_file_count(), p.total_file_count())),
            _ => None,
        }
    }

    /// Total files in the snapshot, once known
    pub fn total_file_count(&self) -> Option<usize> {
        match &self.state {
            FsmState::Indexing(p) => Some(p.total_file_count()),
            FsmState::Ready(index) => Some(index.total_file_count()),
            _ => None,
        }
    }

    /// Current filter false-positive estimate, once an index exists
    pub fn estimated_false_positive_rate(&self) -> Option<f64> {
        match &self.state {
            FsmState::Indexing(p) => Some(p.partial_index().estimated_false_positive_rate()),
            FsmState::Ready(index) => Some(index.estimated_false_positive_rate()),
            _ => None,
        }
    }

    /// Perform one unit of lifecycle work. No-op in terminal states.
    pub fn step(&mut self) {
        // Empty doubles as the placeholder while the state is moved out;
        // every arm puts a successor back before returning.
        let state = std::mem::replace(&mut self.state, FsmState::Empty);

        self.state = match state {
            FsmState::Empty => {
                // Read and decode failures both degrade to a cache miss
                match self.cache.read(&self.cache_key) {
                    Ok(Some(blob)) => match serde_json::from_slice::<Vec<String>>(&blob) {
                        Ok(filenames) => self.start_build(filenames),
                        Err(_) => FsmState::Downloading,
                    },
                    Ok(None) | Err(_) => FsmState::Downloading,
                }
            }
            FsmState::Downloading => match self.source.fetch() {
                Ok(filenames) => {
                    // Best-effort write-back; the cache is an optimization,
                    // not a correctness dependency
                    if let Ok(blob) = serde_json::to_vec(&filenames) {
                        let _ = self.cache.write(&self.cache_key, &blob);
                    }
                    self.start_build(filenames)
                }
                Err(err) => FsmState::Failed(format!("{:#}", err)),
            },
            FsmState::Indexing(progress) => match progress.advance() {
                BuildStep::Indexing(next) => FsmState::Indexing(next),
                BuildStep::Ready(index) => FsmState::Ready(index),
            },
            settled @ (FsmState::Ready(_) | FsmState::Failed(_)) => settled,
        };
    }

    fn start_build(&self, filenames: Vec<String>) -> FsmState {
        match begin_build_with(filenames, self.config.clone()) {
            BuildStep::Indexing(progress) => FsmState::Indexing(progress),
            BuildStep::Ready(index) => FsmState::Ready(index),
        }
    }

    /// Drive the lifecycle until it settles, reporting `(indexed, total)`
    /// after every step. Used by non-interactive hosts.
    pub fn run_to_completion(&mut self, mut on_progress: impl FnMut(usize, usize)) {
        while !self.is_settled() {
            self.step();
            if let Some((indexed, total)) = self.progress() {
                on_progress(indexed, total);
            }
        }
    }

    /// Answer a query from the current index snapshot. `None` unless the
    /// state is `Ready` (complete results) or `Indexing` (partial results,
    /// `is_complete = false`). Identical consecutive queries against an
    /// unchanged snapshot are served from the single-slot cache.
    pub fn search(&mut self, query: &str, max_results: usize) -> Option<FuzzySearchResult> {
        let Self {
            state,
            searcher,
            results,
            ..
        } = self;

        let (index, complete, indexed) = match &*state {
            FsmState::Ready(index) => (index, true, index.total_file_count()),
            FsmState::Indexing(p) => (p.partial_index(), false, p.indexed_file_count()),
            _ => return None,
        };

        let key = CacheKey {
            query: query.to_string(),
            max_results,
            indexed_file_count: indexed,
        };
        if let Some(hit) = results.get(&key) {
            return Some(hit);
        }

        let result = searcher.search(index, query, max_results, complete);
        results.put(key, result.clone());
        Some(result)
    }

    /// Result-cache instrumentation: `(hits, misses)`
    pub fn query_cache_stats(&self) -> (u64, u64) {
        (self.results.hits(), self.results.misses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryCache;
    use anyhow::{anyhow, Result};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Source that serves a fixed list and counts fetches
    struct CountingSource {
        filenames: Vec<String>,
        fetches: Rc<Cell<usize>>,
    }

    impl FilenameSource for CountingSource {
        fn fetch(&mut self) -> Result<Vec<String>> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.filenames.clone())
        }
    }

    struct FailingSource;

    impl FilenameSource for FailingSource {
        fn fetch(&mut self) -> Result<Vec<String>> {
            Err(anyhow!("network unreachable"))
        }
    }

    /// Cache whose reads fail and whose writes fail
    struct BrokenCache;

    impl PersistentCache for BrokenCache {
        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(anyhow!("cache storage unavailable"))
        }

        fn write(&self, _key: &str, _blob: &[u8]) -> Result<()> {
            Err(anyhow!("cache storage unavailable"))
        }
    }

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("src/file_{}.rs", i)).collect()
    }

    fn small_config() -> IndexerConfig {
        IndexerConfig {
            chunk_size: 4,
            sync_threshold: 8,
            bucket_size: 4,
            target_false_positive_rate: 0.01,
        }
    }

    fn finder_with(
        source: impl FilenameSource + 'static,
        cache: impl PersistentCache + 'static,
    ) -> FuzzyFinder {
        FuzzyFinder::with_config(
            Box::new(source),
            Box::new(cache),
            "filenames.test".to_string(),
            small_config(),
            ScoringWeights::default(),
        )
    }

    #[test]
    fn lifecycle_reaches_ready_and_caches_filenames() {
        let fetches = Rc::new(Cell::new(0));
        let cache = MemoryCache::new();
        let mut finder = finder_with(
            CountingSource {
                filenames: names(20),
                fetches: fetches.clone(),
            },
            cache.clone(),
        );

        assert_eq!(finder.state_kind(), FsmStateKind::Empty);
        finder.step(); // cache miss
        assert_eq!(finder.state_kind(), FsmStateKind::Downloading);
        finder.step(); // fetch + first chunk
        assert_eq!(finder.state_kind(), FsmStateKind::Indexing);
        assert_eq!(fetches.get(), 1);
        assert!(cache.contains("filenames.test"), "write-back expected");

        let mut steps = 0;
        while !finder.is_settled() {
            finder.step();
            steps += 1;
            assert!(steps < 100, "lifecycle did not settle");
        }
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
        assert_eq!(finder.total_file_count(), Some(20));

        // Ready is terminal for this snapshot
        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
        assert_eq!(finder.total_file_count(), Some(20));
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn cache_hit_skips_downloading() {
        let cache = MemoryCache::new();
        cache
            .write(
                "filenames.test",
                &serde_json::to_vec(&names(5)).unwrap(),
            )
            .unwrap();

        let fetches = Rc::new(Cell::new(0));
        let mut finder = finder_with(
            CountingSource {
                filenames: names(5),
                fetches: fetches.clone(),
            },
            cache,
        );

        finder.step(); // hydrate from cache; 5 files builds synchronously
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
        assert_eq!(fetches.get(), 0, "source must not be consulted");
    }

    #[test]
    fn corrupt_cache_blob_degrades_to_miss() {
        let cache = MemoryCache::new();
        cache.write("filenames.test", b"{not json!").unwrap();

        let fetches = Rc::new(Cell::new(0));
        let mut finder = finder_with(
            CountingSource {
                filenames: names(5),
                fetches: fetches.clone(),
            },
            cache,
        );

        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Downloading);
        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn broken_cache_never_fails_the_lifecycle() {
        let fetches = Rc::new(Cell::new(0));
        let mut finder = finder_with(
            CountingSource {
                filenames: names(5),
                fetches: fetches.clone(),
            },
            BrokenCache,
        );

        finder.step(); // read error -> miss
        assert_eq!(finder.state_kind(), FsmStateKind::Downloading);
        finder.step(); // fetch ok, write-back error swallowed
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
    }

    #[test]
    fn fetch_failure_is_terminal_with_message() {
        let mut finder = finder_with(FailingSource, MemoryCache::new());

        finder.step();
        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Failed);
        let message = finder.error_message().unwrap();
        assert!(!message.is_empty());
        assert!(message.contains("network unreachable"));

        // Terminal: further steps change nothing, search stays unanswered
        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Failed);
        assert!(finder.search("a", 10).is_none());
    }

    #[test]
    fn progress_strictly_increases_across_steps() {
        let mut finder = finder_with(
            CountingSource {
                filenames: names(20),
                fetches: Rc::new(Cell::new(0)),
            },
            MemoryCache::new(),
        );

        finder.step();
        finder.step();

        let mut last = 0;
        while let Some((indexed, total)) = finder.progress() {
            assert!(indexed > last);
            assert!(indexed <= total);
            last = indexed;
            finder.step();
        }
        assert_eq!(finder.state_kind(), FsmStateKind::Ready);
    }

    #[test]
    fn partial_results_while_indexing() {
        let mut finder = finder_with(
            CountingSource {
                filenames: names(20),
                fetches: Rc::new(Cell::new(0)),
            },
            MemoryCache::new(),
        );

        finder.step();
        finder.step();
        assert_eq!(finder.state_kind(), FsmStateKind::Indexing);

        let partial = finder.search("file", 50).unwrap();
        assert!(!partial.is_complete);
        assert!(partial.results_count() > 0);
        assert!(partial.results_count() < 20);

        finder.run_to_completion(|_, _| {});
        let full = finder.search("file", 50).unwrap();
        assert!(full.is_complete);
        assert_eq!(full.results_count(), 20);
    }

    #[test]
    fn search_unanswerable_before_an_index_exists() {
        let mut finder = finder_with(
            CountingSource {
                filenames: names(5),
                fetches: Rc::new(Cell::new(0)),
            },
            MemoryCache::new(),
        );

        assert!(finder.search("a", 10).is_none()); // Empty
        finder.step();
        assert!(finder.search("a", 10).is_none()); // Downloading
    }

    #[test]
    fn repeated_search_hits_the_result_cache() {
        let mut finder = finder_with(
            CountingSource {
                filenames: names(5),
                fetches: Rc::new(Cell::new(0)),
            },
            MemoryCache::new(),
        );
        finder.run_to_completion(|_, _| {});

        let first = finder.search("file", 10).unwrap();
        let second = finder.search("file", 10).unwrap();
        assert_eq!(first, second);

        let (hits, misses) = finder.query_cache_stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
    }

    #[test]
    fn partial_results_are_not_reused_after_more_indexing() {
        let mut finder = finder_with(
            CountingSource {
                filenames: names(20),
                fetches: Rc::new(Cell::new(0)),
            },
            MemoryCache::new(),
        );
        finder.step();
        finder.step();

        let partial = finder.search("file", 50).unwrap();
        finder.run_to_completion(|_, _| {});
        let full = finder.search("file", 50).unwrap();

        assert!(partial.results_count() < full.results_count());
        let (hits, _) = finder.query_cache_stats();
        assert_eq!(hits, 0, "partial result must not satisfy the later query");
    }
}
