//! Exact subsequence alignment of a query against a path.
//!
//! A small Smith-Waterman-style dynamic program over (query x path) finds
//! the best-scoring way to embed the query as an ordered subsequence of the
//! path. Two score lattices are kept: `m[j][i]` is the best alignment of
//! the first `j+1` query bytes with query byte `j` matched exactly at path
//! position `i`; `h[j][i]` relaxes that to "matched at or before `i`",
//! decaying by the gap penalty per skipped byte. Scratch buffers are owned
//! by the matcher and reused across candidates.
//!
//! Scores only are computed for the full candidate set; matched positions
//! (for highlighting) are reconstructed with a backtrack pass that runs
//! only for the bounded page of returned results.

use crate::index::entry::FileEntry;
use crate::search::scorer::ScoringWeights;

const NEG: i32 = i32::MIN / 2;

/// True when `needle` appears in order (not necessarily contiguously)
/// within `haystack`.
pub fn is_subsequence(needle: &[u8], haystack: &[u8]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|&n| it.any(|&h| h == n))
}

/// Reusable alignment engine.
pub struct Matcher {
    weights: ScoringWeights,
    bonus: Vec<i32>,
    m: Vec<i32>,
    h: Vec<i32>,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            bonus: Vec::new(),
            m: Vec::new(),
            h: Vec::new(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Best alignment score of `query_lower` (pre-lowercased bytes) against
    /// the entry, or `None` when the query is not a subsequence of it.
    /// The empty query trivially matches with score 0.
    pub fn score(&mut self, query_lower: &[u8], entry: &FileEntry) -> Option<i32> {
        self.align(query_lower, entry).map(|(score, _)| score)
    }

    /// Byte offsets of the matched query bytes in the best alignment,
    /// in ascending order. Empty when the query is empty or does not match.
    pub fn positions(&mut self, query_lower: &[u8], entry: &FileEntry) -> Vec<u32> {
        match self.align(query_lower, entry) {
            Some((_, end)) if !query_lower.is_empty() => {
                self.backtrack(query_lower, entry, end)
            }
            _ => Vec::new(),
        }
    }

    /// Run the DP. Returns the best score and the path position where the
    /// final query byte is matched in the best alignment.
    fn align(&mut self, q: &[u8], entry: &FileEntry) -> Option<(i32, usize)> {
        let p = entry.lower();
        let (qn, pn) = (q.len(), p.len());

        if qn == 0 {
            return Some((0, 0));
        }
        // Cheap O(n) reject before filling any lattice
        if qn > pn || !is_subsequence(q, p) {
            return None;
        }

        self.fill_bonuses(entry);
        self.m.clear();
        self.m.resize(qn * pn, NEG);
        self.h.clear();
        self.h.resize(qn * pn, NEG);

        let w = self.weights.clone();
        let basename_at = entry.basename_at();

        for j in 0..qn {
            let qb = q[j];
            let row = j * pn;

            for i in 0..pn {
                let mut best = NEG;

                if p[i] == qb {
                    let base = w.match_bonus
                        + if i >= basename_at { w.basename_bonus } else { 0 };

                    if j == 0 {
                        best = base + self.bonus[i];
                    } else if i > 0 {
                        let prev_row = row - pn;
                        let via_gap = self.h[prev_row + i - 1] + base + self.bonus[i];
                        let via_contig = self.m[prev_row + i - 1]
                            + base
                            + w.contiguous_bonus.max(self.bonus[i]);
                        best = via_gap.max(via_contig);
                    }
                }

                self.m[row + i] = best;
                let decayed = if i > 0 {
                    self.h[row + i - 1] - w.gap_penalty
                } else {
                    NEG
                };
                self.h[row + i] = best.max(decayed);
            }
        }

        let last_row = (qn - 1) * pn;
        let mut best = NEG;
        let mut end = 0;
        for i in 0..pn {
            // strict comparison keeps the earliest position on ties
            if self.m[last_row + i] > best {
                best = self.m[last_row + i];
                end = i;
            }
        }

        (best > NEG / 4).then_some((best, end))
    }

    /// Walk the lattices backwards from the best final match position.
    /// Must be called directly after a successful `align` with the same
    /// arguments; the scratch matrices still hold that alignment.
    fn backtrack(&self, q: &[u8], entry: &FileEntry, end: usize) -> Vec<u32> {
        let pn = entry.lower().len();
        let w = &self.weights;
        let basename_at = entry.basename_at();

        let mut out = vec![0u32; q.len()];
        let mut i = end;
        let mut j = q.len() - 1;

        loop {
            out[j] = i as u32;
            if j == 0 {
                break;
            }

            let prev_row = (j - 1) * pn;
            let base =
                w.match_bonus + if i >= basename_at { w.basename_bonus } else { 0 };
            let via_contig = self.m[prev_row + i - 1]
                + base
                + w.contiguous_bonus.max(self.bonus[i]);

            if via_contig == self.m[j * pn + i] {
                j -= 1;
                i -= 1;
                continue;
            }

            // Came through the gap lattice: the source is the nearest
            // position where h still equals m (left of it, h only carries
            // decayed copies).
            let mut k = i - 1;
            while k > 0 && self.h[prev_row + k] != self.m[prev_row + k] {
                k -= 1;
            }
            j -= 1;
            i = k;
        }

        out
    }

    /// Positional bonuses, judged on the original text bytes.
    fn fill_bonuses(&mut self, entry: &FileEntry) {
        let text = entry.text().as_bytes();
        self.bonus.clear();
        self.bonus.reserve(text.len());

        let mut prev: Option<u8> = None;
        for &cur in text {
            self.bonus.push(self.weights.position_bonus(prev, cur));
            prev = Some(cur);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> Matcher {
        Matcher::new(ScoringWeights::default())
    }

    fn entry(text: &str) -> FileEntry {
        FileEntry::new(text.to_string())
    }

    fn score(query: &str, path: &str) -> Option<i32> {
        matcher().score(query.to_lowercase().as_bytes(), &entry(path))
    }

    #[test]
    fn matches_are_subsequences_only() {
        assert!(score("ats", "src/a.ts").is_some());
        assert!(score("main", "src/main.rs").is_some());
        assert!(score("tsa", "src/a.ts").is_none()); // no 'a' after the final 's'
        assert!(score("xyz", "src/a.ts").is_none());
        assert!(score("aa", "bar/a.ts").is_some());
        assert!(score("aaa", "bar/a.ts").is_none());
    }

    #[test]
    fn case_insensitive_against_original_case() {
        assert!(score("main", "src/Main.RS").is_some());
        assert!(score("MAIN", "src/main.rs").is_some());
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(score("", "anything"), Some(0));
        assert!(matcher().positions(b"", &entry("anything")).is_empty());
    }

    #[test]
    fn query_longer_than_path_never_matches() {
        assert!(score("abcdef", "abc").is_none());
    }

    #[test]
    fn contiguous_run_beats_scattered() {
        let contiguous = score("abc", "x/abc.ts").unwrap();
        let scattered = score("abc", "xaxxbxxc.ts").unwrap();
        assert!(
            contiguous > scattered,
            "contiguous {} must beat scattered {}",
            contiguous,
            scattered
        );
    }

    #[test]
    fn segment_anchored_beats_mid_word() {
        let anchored = score("abc", "a/b/c.ts").unwrap();
        let buried = score("abc", "xxaxxbxxcxx.ts").unwrap();
        assert!(anchored > buried);
    }

    #[test]
    fn basename_match_beats_directory_match() {
        let in_basename = score("util", "src/util.rs").unwrap();
        let in_directory = score("util", "util/src.rs").unwrap();
        assert!(in_basename > in_directory);
    }

    #[test]
    fn camel_transition_is_an_anchor() {
        let camel = score("fs", "myFuzzySearch.ts").unwrap();
        let plain = score("fs", "myxfuxzzysearch.ts").unwrap();
        assert!(camel > plain);
    }

    #[test]
    fn positions_point_at_matched_bytes() {
        let mut m = matcher();
        let e = entry("src/main.rs");
        let positions = m.positions(b"main", &e);
        assert_eq!(positions, vec![4, 5, 6, 7]);

        let text = e.text().as_bytes();
        for (qi, &pi) in b"main".iter().zip(&positions) {
            assert_eq!(text[pi as usize].to_ascii_lowercase(), *qi);
        }
    }

    #[test]
    fn positions_are_strictly_increasing() {
        let mut m = matcher();
        let e = entry("fuzzy/finder/index.rs");
        let positions = m.positions(b"fzidx", &e);
        assert_eq!(positions.len(), 5);
        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn positions_prefer_the_anchored_alignment() {
        let mut m = matcher();
        // "ab" occurs scattered early and contiguous at the basename
        let e = entry("axxbx/ab.ts");
        let positions = m.positions(b"ab", &e);
        assert_eq!(positions, vec![6, 7]);
    }

    #[test]
    fn no_match_yields_no_positions() {
        let mut m = matcher();
        assert!(m.positions(b"zzz", &entry("src/a.ts")).is_empty());
    }
}
