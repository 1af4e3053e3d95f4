//! Key/value backends for [`CacheStore`](super::CacheStore).
//!
//! Backends store opaque strings; TTL handling lives one layer up in
//! `CacheStore`, which serializes a [`CacheEntry`](super::CacheEntry) into the
//! value. That keeps backends trivial and lets a shared store (files, redis,
//! ...) be swapped in without touching expiry logic.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use moka::future::Cache;

use crate::{MimirError, Result};

/// Default maximum number of entries held by [`MemoryStore`].
const DEFAULT_MEMORY_MAX: u64 = 10_000;

/// Persistent (or not) string key/value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Look up a value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Bounded in-process store.
///
/// Uses moka for LRU eviction so long-running processes cannot grow without
/// bound. Contents are lost when the process exits.
pub struct MemoryStore {
    entries: Cache<String, String>,
}

impl MemoryStore {
    /// Create an empty store with the default capacity (10,000).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MEMORY_MAX)
    }

    pub fn with_max_entries(max: u64) -> Self {
        Self {
            entries: Cache::new(max),
        }
    }

    /// Number of entries currently stored.
    ///
    /// Flushes moka's pending maintenance first so the count is exact.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per entry.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never observes a half-written entry.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location: `~/.cache/mimir/artifacts`.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("mimir")
            .join("artifacts")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(MimirError::CacheRead(format!(
                "key {key:?} is not a valid file name"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MimirError::CacheRead(format!("{}: {e}", path.display()))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self
            .path_for(key)
            .map_err(|e| MimirError::CacheWrite(e.to_string()))?;
        let write_err =
            |e: std::io::Error| MimirError::CacheWrite(format!("{}: {e}", path.display()));

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_err)?;
        // One temp file per writer, so concurrent sets of a key never share it.
        let tmp = self.dir.join(format!(
            "{key}.{}.{:016x}.tmp",
            std::process::id(),
            rand::random::<u64>()
        ));
        if let Err(e) = tokio::fs::write(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        Ok(())
    }
}
