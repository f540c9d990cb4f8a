use crate::source::PersistentCache;
use crate::utils::app_data::get_app_data_dir;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent cache storing one blob file per key.
///
/// Lives under the per-user application data directory by default; tests
/// and embedders can point it anywhere with [`DiskCache::at`]. Keys are
/// expected to be filesystem-safe (see `app_data::cache_key_for_root`).
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Cache under `<app data dir>/filenames`
    pub fn open_default() -> Result<Self> {
        Self::at(get_app_data_dir()?.join("filenames"))
    }

    /// Cache rooted at an explicit directory, created if missing
    pub fn at(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete every cached blob. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Drop one key if present
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache blob {}", path.display()))?;
        }
        Ok(())
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl PersistentCache for DiskCache {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let blob = fs::read(&path)
            .with_context(|| format!("Failed to read cache blob {}", path.display()))?;
        Ok(Some(blob))
    }

    fn write(&self, key: &str, blob: &[u8]) -> Result<()> {
        let path = self.blob_path(key);
        fs::write(&path, blob)
            .with_context(|| format!("Failed to write cache blob {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("fzi_cache_tests")
            .join(format!("{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn round_trip_and_miss() {
        let dir = cache_dir("round_trip");
        let cache = DiskCache::at(dir.clone()).unwrap();

        assert_eq!(cache.read("absent").unwrap(), None);
        cache.write("filenames.test", b"[\"a.rs\"]").unwrap();
        assert_eq!(
            cache.read("filenames.test").unwrap().as_deref(),
            Some(&b"[\"a.rs\"]"[..])
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_removes_blobs() {
        let dir = cache_dir("clear");
        let cache = DiskCache::at(dir.clone()).unwrap();

        cache.write("one", b"1").unwrap();
        cache.write("two", b"2").unwrap();
        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(cache.read("one").unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }
}
