#![no_main]

use libfuzzer_sys::fuzz_target;

// Fragment soundness: whenever `query` is a byte subsequence of `path`,
// every fragment of `query` must also be a fragment of `path`. A violation
// would mean the bloom pre-filter can drop a true match.
fuzz_target!(|input: (&[u8], &[u8])| {
    let (query, path) = input;

    let query_frags = fzi::utils::fragment::fragments(query);
    let path_frags = fzi::utils::fragment::fragments(path);

    let mut it = path.iter();
    let is_subsequence = query.iter().all(|&n| it.any(|&h| h == n));

    if is_subsequence {
        for frag in &query_frags {
            assert!(
                path_frags.contains(frag),
                "fragment {:#x} of the query is missing from the path",
                frag
            );
        }
    }
});
