//! End-to-end lifecycle tests against a real on-disk fixture: repository
//! walk -> download -> incremental build -> ready -> queries, plus the
//! cached-filenames fast path on a second run.

use fzi::fsm::{FsmStateKind, FuzzyFinder};
use fzi::index::builder::IndexerConfig;
use fzi::search::scorer::ScoringWeights;
use fzi::source::{DiskCache, PersistentCache, RepoWalkSource};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

static FIXTURE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get or create the shared repository fixture (singleton)
fn fixture_repo() -> PathBuf {
    FIXTURE_DIR.get_or_init(create_fixture_repo).clone()
}

fn create_fixture_repo() -> PathBuf {
    let dir = std::env::temp_dir()
        .join("fzi_lifecycle_fixture")
        .join(format!("repo_{}", std::process::id()));

    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("src")).expect("Failed to create fixture dir");
    fs::create_dir_all(dir.join("test")).unwrap();
    fs::create_dir_all(dir.join("docs/guide")).unwrap();

    for (path, body) in [
        ("src/a.ts", "export {}\n"),
        ("src/b.ts", "export {}\n"),
        ("test/a.ts", "import {} from '../src/a'\n"),
        ("src/main.rs", "fn main() {}\n"),
        ("docs/guide/intro.md", "# Intro\n"),
        ("Cargo.toml", "[package]\n"),
    ] {
        fs::write(dir.join(path), body).unwrap();
    }

    dir
}

fn fresh_cache_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("fzi_lifecycle_cache")
        .join(format!("{}_{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Tiny chunks so even the six-file fixture exercises the chunked path
fn chunked_config() -> IndexerConfig {
    IndexerConfig {
        chunk_size: 2,
        sync_threshold: 1,
        bucket_size: 2,
        target_false_positive_rate: 0.01,
    }
}

fn finder(cache_dir: PathBuf) -> FuzzyFinder {
    FuzzyFinder::with_config(
        Box::new(RepoWalkSource::new(fixture_repo())),
        Box::new(DiskCache::at(cache_dir).unwrap()),
        "filenames.fixture".to_string(),
        chunked_config(),
        ScoringWeights::default(),
    )
}

#[test]
fn full_lifecycle_over_a_real_repository() {
    let cache_dir = fresh_cache_dir("full");
    let mut f = finder(cache_dir.clone());

    assert_eq!(f.state_kind(), FsmStateKind::Empty);
    f.step();
    assert_eq!(f.state_kind(), FsmStateKind::Downloading);
    f.step();
    assert_eq!(f.state_kind(), FsmStateKind::Indexing);

    let mut observed = Vec::new();
    f.run_to_completion(|indexed, total| observed.push((indexed, total)));
    assert_eq!(f.state_kind(), FsmStateKind::Ready);
    assert_eq!(f.total_file_count(), Some(6));
    assert!(observed.windows(2).all(|w| w[0].0 < w[1].0));

    let result = f.search("a.ts", 10).unwrap();
    let texts: Vec<&str> = result.matches.iter().map(|m| m.text.as_str()).collect();
    assert!(texts.contains(&"src/a.ts"));
    assert!(texts.contains(&"test/a.ts"));
    assert!(!texts.contains(&"src/b.ts"));
    assert!(result.is_complete);

    let _ = fs::remove_dir_all(&cache_dir);
}

#[test]
fn second_run_hydrates_from_the_persistent_cache() {
    let cache_dir = fresh_cache_dir("hydrate");

    let mut first = finder(cache_dir.clone());
    first.run_to_completion(|_, _| {});
    assert_eq!(first.state_kind(), FsmStateKind::Ready);

    // The blob exists on disk now, so a fresh session must go straight
    // from Empty into the build without passing Downloading
    let mut second = finder(cache_dir.clone());
    second.step();
    assert_eq!(second.state_kind(), FsmStateKind::Indexing);

    second.run_to_completion(|_, _| {});
    assert_eq!(second.total_file_count(), Some(6));

    let _ = fs::remove_dir_all(&cache_dir);
}

#[test]
fn cleared_cache_falls_back_to_the_walk() {
    let cache_dir = fresh_cache_dir("cleared");

    let mut first = finder(cache_dir.clone());
    first.run_to_completion(|_, _| {});

    let cache = DiskCache::at(cache_dir.clone()).unwrap();
    assert!(cache.clear().unwrap() >= 1);
    assert_eq!(cache.read("filenames.fixture").unwrap(), None);

    let mut second = finder(cache_dir.clone());
    second.step();
    assert_eq!(second.state_kind(), FsmStateKind::Downloading);
    second.run_to_completion(|_, _| {});
    assert_eq!(second.state_kind(), FsmStateKind::Ready);

    let _ = fs::remove_dir_all(&cache_dir);
}

#[test]
fn queries_are_served_while_indexing_the_fixture() {
    let cache_dir = fresh_cache_dir("partial");
    let mut f = finder(cache_dir.clone());

    f.step();
    f.step();
    assert_eq!(f.state_kind(), FsmStateKind::Indexing);

    // Partial answers are allowed and flagged incomplete
    let partial = f.search("", 10).unwrap();
    assert!(!partial.is_complete);
    assert!(partial.total_file_count < 6);

    f.run_to_completion(|_, _| {});
    let full = f.search("", 10).unwrap();
    assert!(full.is_complete);
    assert_eq!(full.total_file_count, 6);

    let _ = fs::remove_dir_all(&cache_dir);
}
