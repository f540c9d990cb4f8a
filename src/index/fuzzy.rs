//! The fuzzy filename index: bucketed entries behind per-bucket bloom filters.
//!
//! A naive fuzzy match against every filename on every keystroke is the
//! dominant cost on large repositories. Partitioning entries into buckets
//! and keeping one bloom filter per bucket lets a query reject most buckets
//! wholesale: the filter holds every byte fragment of every entry in the
//! bucket, so a missing query fragment proves no entry in the bucket can be
//! a subsequence match. Filter misses are exact; filter hits may admit
//! entries that fail the exact match later (false positives, surfaced to
//! the caller as a ratio, never hidden).

use crate::index::entry::FileEntry;
use crate::utils::bloom::BloomFilter;
use crate::utils::fragment::{self, Fragment};
use rustc_hash::FxHashSet;

/// A fixed-size run of consecutive entries sharing one bloom filter.
#[derive(Debug, Clone)]
struct Bucket {
    entries: Vec<FileEntry>,
    filter: BloomFilter,
}

impl Bucket {
    fn build(entries: Vec<FileEntry>, target_fpr: f64) -> Self {
        // Exact fragment set first, so the filter is sized for what it
        // actually holds rather than a guess.
        let mut fragments: FxHashSet<Fragment> = FxHashSet::default();
        for entry in &entries {
            fragments.extend(fragment::fragments(entry.lower()));
        }

        let mut filter = BloomFilter::new(fragments.len(), target_fpr);
        for frag in fragments {
            filter.insert(frag);
        }

        Self { entries, filter }
    }
}

/// Probabilistic membership index over an ordered filename sequence.
///
/// Owns its entries; never mutated after a bucket is sealed. Building from
/// an empty filename list degenerates to a zero-entry index and never fails.
#[derive(Debug, Clone)]
pub struct FuzzyIndex {
    buckets: Vec<Bucket>,
    total_file_count: usize,
    bucket_size: usize,
    target_fpr: f64,
}

impl FuzzyIndex {
    pub(crate) fn with_config(bucket_size: usize, target_fpr: f64) -> Self {
        Self {
            buckets: Vec::new(),
            total_file_count: 0,
            bucket_size: bucket_size.max(1),
            target_fpr,
        }
    }

    /// Append one build chunk, sealing it into buckets.
    pub(crate) fn append<I: IntoIterator<Item = String>>(&mut self, filenames: I) {
        let mut pending: Vec<FileEntry> = Vec::with_capacity(self.bucket_size);

        for name in filenames {
            pending.push(FileEntry::new(name));
            if pending.len() == self.bucket_size {
                self.seal(std::mem::take(&mut pending));
            }
        }
        if !pending.is_empty() {
            self.seal(pending);
        }
    }

    fn seal(&mut self, entries: Vec<FileEntry>) {
        self.total_file_count += entries.len();
        self.buckets.push(Bucket::build(entries, self.target_fpr));
    }

    /// Number of entries indexed
    pub fn total_file_count(&self) -> usize {
        self.total_file_count
    }

    /// Whether any bucket might contain the fragment.
    /// False means the fragment occurs in no indexed entry.
    pub fn may_contain(&self, fragment: Fragment) -> bool {
        self.buckets.iter().any(|b| b.filter.might_contain(fragment))
    }

    /// All entries, in index order
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.buckets.iter().flat_map(|b| b.entries.iter())
    }

    /// Entries that survive the filter pre-pass for the given query
    /// fragments, in index order. A superset of the true matches: buckets
    /// whose filter rejects any fragment are skipped entirely, and a
    /// rejected bucket can never hold a true match.
    pub fn candidates<'a>(
        &'a self,
        fragments: &'a [Fragment],
    ) -> impl Iterator<Item = &'a FileEntry> {
        self.buckets
            .iter()
            .filter(|b| b.filter.might_contain_all(fragments))
            .flat_map(|b| b.entries.iter())
    }

    /// Entry-count-weighted mean of the per-bucket bloom estimates.
    /// Recomputable after every build step; grows monotonically with the
    /// fill level of the filters.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        if self.total_file_count == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .buckets
            .iter()
            .map(|b| b.filter.estimated_false_positive_rate() * b.entries.len() as f64)
            .sum();
        weighted / self.total_file_count as f64
    }

    /// Number of sealed buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Approximate memory held by the bloom filters, in bytes
    pub fn filter_memory_usage(&self) -> usize {
        self.buckets.iter().map(|b| b.filter.memory_usage()).sum()
    }
}
