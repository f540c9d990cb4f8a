//! Collaborators that supply filenames to the index lifecycle.
//!
//! The core only ever sees these two traits; the shipped implementations
//! ([`RepoWalkSource`], [`DiskCache`]) live behind them, and tests swap in
//! [`MemoryCache`] and purpose-built sources.

pub mod persist;
pub mod walk;

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use persist::DiskCache;
pub use walk::RepoWalkSource;

/// Supplies the raw filename list. One fetch per lifecycle; a fresh
/// snapshot means a fresh lifecycle.
pub trait FilenameSource {
    fn fetch(&mut self) -> Result<Vec<String>>;
}

/// Pluggable key-value blob store used to skip refetching the filename
/// list. The lifecycle treats read failures as a miss and swallows write
/// failures; implementations need no such leniency themselves.
pub trait PersistentCache {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&self, key: &str, blob: &[u8]) -> Result<()>;
}

/// In-process cache for tests and embedding. Clones share storage, so a
/// test can keep a handle while the lifecycle owns another.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }
}

impl PersistentCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, blob: &[u8]) -> Result<()> {
        self.inner.borrow_mut().insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.read("k").unwrap(), None);

        cache.write("k", b"payload").unwrap();
        assert_eq!(cache.read("k").unwrap().as_deref(), Some(&b"payload"[..]));
    }

    #[test]
    fn memory_cache_clones_share_storage() {
        let cache = MemoryCache::new();
        let handle = cache.clone();

        cache.write("k", b"v").unwrap();
        assert!(handle.contains("k"));
    }
}
