//! Query execution: filter pre-pass, exact scoring, ranking, truncation.

use crate::index::entry::FileEntry;
use crate::index::fuzzy::FuzzyIndex;
use crate::search::matcher::Matcher;
use crate::search::scorer::ScoringWeights;
use crate::utils::fragment::{self, Fragment};
use std::time::{Duration, Instant};

/// A query prepared for matching: lowercased bytes plus the fragment set
/// probed against the bucket filters.
#[derive(Debug, Clone)]
pub struct FuzzyQuery {
    text: String,
    lower: Vec<u8>,
    fragments: Vec<Fragment>,
}

impl FuzzyQuery {
    pub fn new(text: &str) -> Self {
        let lower: Vec<u8> = text.bytes().map(|b| b.to_ascii_lowercase()).collect();
        let fragments = fragment::fragments(&lower);
        Self {
            text: text.to_string(),
            lower,
            fragments,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lower(&self) -> &[u8] {
        &self.lower
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

/// One ranked match: the path, the matched byte offsets (for highlighting)
/// and the alignment score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub text: String,
    pub positions: Vec<u32>,
    pub score: i32,
}

/// Result of a single search. Immutable; created fresh per query unless
/// served from the result cache, in which case it is value-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzySearchResult {
    /// Ranked matches, truncated to `max_results`
    pub matches: Vec<FileMatch>,
    /// True only when nothing was truncated AND the index was complete
    pub is_complete: bool,
    /// Files in the index snapshot this result was computed against
    pub total_file_count: usize,
    /// Entries that survived the filter pre-pass
    pub candidate_count: usize,
    /// Fraction of candidates that failed exact matching. Diagnostic only:
    /// quantifies filter overhead, never affects which matches are returned.
    pub false_positive_ratio: f64,
    pub elapsed: Duration,
}

impl FuzzySearchResult {
    pub fn results_count(&self) -> usize {
        self.matches.len()
    }
}

/// Search engine over a built (possibly partial) index. Owns the matcher
/// scratch so repeated queries do not reallocate.
pub struct FuzzySearcher {
    matcher: Matcher,
}

impl Default for FuzzySearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearcher {
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            matcher: Matcher::new(weights),
        }
    }

    /// Run `query` against `index`, returning at most `max_results` ranked
    /// matches. `index_complete` marks whether the index covers the whole
    /// filename snapshot or a partial build.
    pub fn search(
        &mut self,
        index: &FuzzyIndex,
        query: &str,
        max_results: usize,
        index_complete: bool,
    ) -> FuzzySearchResult {
        let start = Instant::now();
        let total = index.total_file_count();
        let query = FuzzyQuery::new(query);

        if query.is_empty() {
            let matches: Vec<FileMatch> = index
                .entries()
                .take(max_results)
                .map(|e| FileMatch {
                    text: e.text().to_string(),
                    positions: Vec::new(),
                    score: 0,
                })
                .collect();

            return FuzzySearchResult {
                is_complete: total <= max_results && index_complete,
                total_file_count: total,
                candidate_count: total,
                false_positive_ratio: 0.0,
                elapsed: start.elapsed(),
                matches,
            };
        }

        let mut candidate_count = 0usize;
        let mut scored: Vec<(&FileEntry, i32)> = Vec::new();

        for entry in index.candidates(query.fragments()) {
            candidate_count += 1;
            if let Some(score) = self.matcher.score(query.lower(), entry) {
                scored.push((entry, score));
            }
        }

        let false_positive_ratio = if candidate_count == 0 {
            0.0
        } else {
            (candidate_count - scored.len()) as f64 / candidate_count as f64
        };

        // Rank: score descending, then shorter path, then lexicographic
        scored.sort_unstable_by(|(ea, sa), (eb, sb)| {
            sb.cmp(sa)
                .then_with(|| ea.text().len().cmp(&eb.text().len()))
                .then_with(|| ea.text().cmp(eb.text()))
        });

        let is_complete = scored.len() <= max_results && index_complete;
        scored.truncate(max_results);

        // Highlight offsets only for the page that is actually returned
        let matches: Vec<FileMatch> = scored
            .into_iter()
            .map(|(entry, score)| FileMatch {
                text: entry.text().to_string(),
                positions: self.matcher.positions(query.lower(), entry),
                score,
            })
            .collect();

        FuzzySearchResult {
            matches,
            is_complete,
            total_file_count: total,
            candidate_count,
            false_positive_ratio,
            elapsed: start.elapsed(),
        }
    }
}
