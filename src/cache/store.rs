//! Cache store backends.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Identifies one cached dataset: a place key at one radius.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub place: String,
    pub radius_km: u32,
}

impl CacheKey {
    pub fn new(place: impl Into<String>, radius_km: u32) -> Self {
        Self {
            place: place.into(),
            radius_km,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}km.osm", self.place, self.radius_km)
    }
}

/// Key-value storage for raw dataset text.
///
/// Backends are swappable so tests run against memory and production
/// against the filesystem without touching pipeline logic.
pub trait CacheStore {
    fn contains(&self, key: &CacheKey) -> bool;
    fn read(&self, key: &CacheKey) -> Result<String>;
    fn write(&self, key: &CacheKey, payload: &str) -> Result<()>;
}

/// Filesystem-backed store: one file per (place, radius).
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl CacheStore for FsCache {
    fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn read(&self, key: &CacheKey) -> Result<String> {
        let path = self.path_for(key);
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry {}", path.display()))
    }

    fn write(&self, key: &CacheKey, payload: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))
    }
}

/// In-memory store for tests and offline dry runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .contains_key(key)
    }

    fn read(&self, key: &CacheKey) -> Result<String> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .get(key)
            .cloned()
            .with_context(|| format!("No cache entry for {}", key.file_name()))
    }

    fn write(&self, key: &CacheKey, payload: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.clone(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_file_name() {
        let key = CacheKey::new("Anhui_Hefei_Yaohai_Mingguang", 3);
        assert_eq!(key.file_name(), "Anhui_Hefei_Yaohai_Mingguang_3km.osm");
    }

    #[test]
    fn test_fs_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = CacheKey::new("Somewhere", 1);

        assert!(!cache.contains(&key));
        cache.write(&key, "<osm/>").unwrap();
        assert!(cache.contains(&key));
        assert_eq!(cache.read(&key).unwrap(), "<osm/>");
    }

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        let key = CacheKey::new("Somewhere", 3);

        assert!(!cache.contains(&key));
        assert!(cache.read(&key).is_err());
        cache.write(&key, "payload").unwrap();
        assert_eq!(cache.read(&key).unwrap(), "payload");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_radius_distinguishes_entries() {
        let cache = MemoryCache::new();
        cache.write(&CacheKey::new("P", 3), "three").unwrap();
        assert!(!cache.contains(&CacheKey::new("P", 1)));
    }
}
