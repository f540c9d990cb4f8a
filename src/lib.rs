//! # FZI - Interactive Fuzzy Filename Finder
//!
//! FZI narrows a repository's file list (100k+ files) to fuzzy-matching
//! paths with sub-frame latency, building its in-memory index in
//! cooperative increments so the interactive thread is never blocked for
//! more than one small time slice.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Bucketed bloom-filter index and its incremental builder
//! - [`search`] - Subsequence matching, ranking, and the result cache
//! - [`fsm`] - Index lifecycle state machine and the search session
//! - [`source`] - Filename sources and the persistent filename cache
//! - [`output`] - One-shot result formatting
//! - [`utils`] - Bloom filter, fragment extraction, app data paths
//!
//! ## Quick Start
//!
//! ```ignore
//! use fzi::fsm::FuzzyFinder;
//! use fzi::source::{DiskCache, RepoWalkSource};
//! use fzi::utils::cache_key_for_root;
//! use std::path::PathBuf;
//!
//! let root = PathBuf::from("/path/to/repo");
//! let key = cache_key_for_root(&root);
//! let mut finder = FuzzyFinder::new(
//!     Box::new(RepoWalkSource::new(root)),
//!     Box::new(DiskCache::open_default()?),
//!     key,
//! );
//!
//! // One lifecycle step per scheduling turn; queries work mid-build
//! finder.run_to_completion(|_indexed, _total| {});
//! let result = finder.search("main", 50).unwrap();
//!
//! for m in &result.matches {
//!     println!("{}", m.text);
//! }
//! ```
//!
//! ## How it stays fast
//!
//! Entries are partitioned into buckets, each guarded by a bloom filter
//! over the byte fragments of its paths. A query rejects most buckets
//! without looking at a single filename; only the surviving candidates go
//! through the exact Smith-Waterman-style alignment. The filter can admit
//! false positives (surfaced as a diagnostic ratio) but never drops a true
//! match.

pub mod fsm;
pub mod index;
pub mod output;
pub mod search;
pub mod source;
#[cfg(feature = "interactive")]
pub mod tui;
pub mod utils;
