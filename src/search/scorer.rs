//! Scoring weights for fuzzy filename ranking.
//!
//! The matcher rewards contiguous runs and matches anchored at path-segment
//! boundaries over the same characters scattered through an unrelated path,
//! which is what makes `abc` rank `a/b/c.ts` and `abcService.ts` first.
//! Weights are tunable as long as that ordering holds.

use serde::{Deserialize, Serialize};

/// Configurable weights for the fuzzy match score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Base score per matched byte
    pub match_bonus: i32,
    /// Extra score when a matched byte directly follows the previous match
    pub contiguous_bonus: i32,
    /// Position bonus right after a path separator, or at the very start
    pub separator_bonus: i32,
    /// Position bonus right after `_`, `-`, `.` or a space
    pub boundary_bonus: i32,
    /// Position bonus at a lowercase-to-uppercase transition
    pub camel_bonus: i32,
    /// Extra score per matched byte inside the basename
    pub basename_bonus: i32,
    /// Penalty per skipped byte between two matched bytes
    pub gap_penalty: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            match_bonus: 16,
            contiguous_bonus: 12,
            separator_bonus: 10,
            boundary_bonus: 8,
            camel_bonus: 7,
            basename_bonus: 2,
            gap_penalty: 1,
        }
    }
}

impl ScoringWeights {
    /// Positional bonus for matching the byte at a given position, judged
    /// from the original (non-lowercased) text so camel transitions are
    /// still visible.
    #[inline]
    pub fn position_bonus(&self, prev: Option<u8>, cur: u8) -> i32 {
        match prev {
            None | Some(b'/') => self.separator_bonus,
            Some(b'_' | b'-' | b'.' | b' ') => self.boundary_bonus,
            Some(p) if p.is_ascii_lowercase() && cur.is_ascii_uppercase() => self.camel_bonus,
            _ => 0,
        }
    }
}
