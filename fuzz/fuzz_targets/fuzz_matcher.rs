#![no_main]

use fzi::index::entry::FileEntry;
use fzi::search::matcher::{is_subsequence, Matcher};
use fzi::search::scorer::ScoringWeights;
use libfuzzer_sys::fuzz_target;

// The matcher must agree with the naive subsequence oracle, and its
// highlight positions must point at the matched bytes in ascending order.
fuzz_target!(|input: (String, String)| {
    let (query, path) = input;

    let entry = FileEntry::new(path);
    let query_lower: Vec<u8> = query.bytes().map(|b| b.to_ascii_lowercase()).collect();

    let mut matcher = Matcher::new(ScoringWeights::default());
    let score = matcher.score(&query_lower, &entry);

    assert_eq!(
        score.is_some(),
        is_subsequence(&query_lower, entry.lower()),
        "matcher disagrees with the subsequence oracle"
    );

    if score.is_some() && !query_lower.is_empty() {
        let positions = matcher.positions(&query_lower, &entry);
        assert_eq!(positions.len(), query_lower.len());

        let lower = entry.lower();
        let mut last: Option<u32> = None;
        for (qb, &pos) in query_lower.iter().zip(&positions) {
            assert_eq!(lower[pos as usize], *qb);
            if let Some(prev) = last {
                assert!(pos > prev, "positions must strictly increase");
            }
            last = Some(pos);
        }
    }
});
