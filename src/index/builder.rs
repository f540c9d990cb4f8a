//! Chunked, resumable construction of a [`FuzzyIndex`].
//!
//! Building the filters over 100k+ filenames in one pass would freeze an
//! interactive caller for a visible duration. The builder instead indexes a
//! bounded chunk per call and hands back an explicit resumable progress
//! value (filename arena + cursor + partial index), so the host can
//! interleave build steps with input handling and even serve queries
//! against the partial index while the build continues.

use crate::index::fuzzy::FuzzyIndex;
use serde::{Deserialize, Serialize};

/// Knobs for the incremental builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Files indexed per `advance` call. Sized so one chunk completes
    /// within low tens of milliseconds.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Entry counts at or below this build synchronously in `begin_build`
    #[serde(default = "default_sync_threshold")]
    pub sync_threshold: usize,
    /// Entries per bloom-filter bucket
    #[serde(default = "default_bucket_size")]
    pub bucket_size: usize,
    /// Target false-positive rate for each bucket filter
    #[serde(default = "default_target_fpr")]
    pub target_false_positive_rate: f64,
}

fn default_chunk_size() -> usize {
    2048
}

fn default_sync_threshold() -> usize {
    4096
}

fn default_bucket_size() -> usize {
    512
}

fn default_target_fpr() -> f64 {
    0.01
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            sync_threshold: default_sync_threshold(),
            bucket_size: default_bucket_size(),
            target_false_positive_rate: default_target_fpr(),
        }
    }
}

/// Outcome of one build step: either more work remains or the index is done.
pub enum BuildStep {
    Indexing(IndexingProgress),
    Ready(FuzzyIndex),
}

/// Resumable build state.
///
/// Advancing consumes the value and produces a fresh one; nothing is
/// mutated in place between steps, so an abandoned progress value can
/// simply be dropped with no corruption risk.
pub struct IndexingProgress {
    /// Filename arena; consumed entries are left behind as empty strings
    filenames: Vec<String>,
    /// Cursor into the arena; equals `indexed_file_count`
    next: usize,
    partial: FuzzyIndex,
    config: IndexerConfig,
}

impl IndexingProgress {
    /// Index exactly one more chunk.
    pub fn advance(mut self) -> BuildStep {
        let end = (self.next + self.config.chunk_size.max(1)).min(self.filenames.len());
        self.partial
            .append(self.filenames[self.next..end].iter_mut().map(std::mem::take));
        self.next = end;

        if self.next == self.filenames.len() {
            BuildStep::Ready(self.partial)
        } else {
            BuildStep::Indexing(self)
        }
    }

    /// Files indexed so far; strictly increases on each `advance`
    pub fn indexed_file_count(&self) -> usize {
        self.next
    }

    /// Total files this build will cover
    pub fn total_file_count(&self) -> usize {
        self.filenames.len()
    }

    /// The partial index, queryable at any time
    pub fn partial_index(&self) -> &FuzzyIndex {
        &self.partial
    }
}

/// Start building an index over `filenames`.
///
/// Small inputs (at or below the sync threshold) complete in one pass and
/// return `Ready` directly; larger inputs index the first chunk and return
/// `Indexing`.
pub fn begin_build(filenames: Vec<String>) -> BuildStep {
    begin_build_with(filenames, IndexerConfig::default())
}

/// `begin_build` with explicit knobs.
pub fn begin_build_with(filenames: Vec<String>, config: IndexerConfig) -> BuildStep {
    let mut partial =
        FuzzyIndex::with_config(config.bucket_size, config.target_false_positive_rate);

    if filenames.len() <= config.sync_threshold {
        partial.append(filenames);
        return BuildStep::Ready(partial);
    }

    let progress = IndexingProgress {
        filenames,
        next: 0,
        partial,
        config,
    };
    progress.advance()
}
