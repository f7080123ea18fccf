//! Session scoped cache of resolved preferences
//!
//! The cache sits in front of the preference store and is strictly best
//! effort: storage failures and unparseable values are logged and reported
//! as misses, never as errors.

pub mod entry;
pub mod storage;

pub use entry::CacheEntry;
pub use storage::{MemorySessionStorage, SessionStorage};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::error::{PrefError, PrefResult};
use crate::types::PreferenceKey;

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    /// Values present but unreadable or written for another entry point
    pub corrupt: u64,
    pub write_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    corrupt: AtomicU64,
    write_failures: AtomicU64,
}

/// Local cache keyed by `(user, model, action)`
pub struct LocalCache {
    storage: Arc<dyn SessionStorage>,
    prefix: String,
    counters: Counters,
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("prefix", &self.prefix)
            .field("counters", &self.counters)
            .finish()
    }
}

impl LocalCache {
    pub fn new(storage: Arc<dyn SessionStorage>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            counters: Counters::default(),
        }
    }

    pub fn storage_key(&self, key: &PreferenceKey) -> String {
        key.storage_key(&self.prefix)
    }

    /// Cached entry for `key`, or `None` on a miss or any storage problem
    pub fn get(&self, key: &PreferenceKey) -> Option<CacheEntry> {
        match self.try_get(key) {
            Ok(Some(entry)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Local cache hit for {}", key);
                Some(entry)
            }
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Local cache miss for {}", key);
                None
            }
            Err(e) => {
                if matches!(e, PrefError::CorruptEntry { .. }) {
                    self.counters.corrupt.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                }
                warn!("Ignoring local cache entry for {}: {}", key, e);
                None
            }
        }
    }

    /// Store `entry` under `key`. Failures are logged and dropped.
    pub fn put(&self, key: &PreferenceKey, entry: &CacheEntry) {
        if let Err(e) = self.try_put(key, entry) {
            self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
            warn!("Failed to cache preference for {}: {}", key, e);
        }
    }

    /// Drop the entry for `key`. Failures are logged.
    pub fn remove(&self, key: &PreferenceKey) {
        let storage_key = self.storage_key(key);
        if let Err(e) = self.storage.remove_item(&storage_key) {
            warn!("Failed to remove cached preference '{}': {}", storage_key, e);
        }
    }

    /// Remove every entry written under this cache's prefix
    pub fn clear(&self) -> usize {
        let marker = format!("{}_", self.prefix);
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to enumerate session storage: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(&marker)) {
            match self.storage.remove_item(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove cached preference '{}': {}", key, e),
            }
        }
        debug!("Cleared {} cached preference(s)", removed);
        removed
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            corrupt: self.counters.corrupt.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
        }
    }

    fn try_get(&self, key: &PreferenceKey) -> PrefResult<Option<CacheEntry>> {
        let storage_key = self.storage_key(key);
        let Some(raw) = self.storage.get_item(&storage_key)? else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&raw)
            .map_err(|e| PrefError::corrupt_entry(&storage_key, e.to_string()))?;
        if !entry.matches(key) {
            return Err(PrefError::corrupt_entry(
                &storage_key,
                format!(
                    "entry belongs to {}/{}",
                    entry.model_name,
                    entry.action_id.as_deref().unwrap_or("none")
                ),
            ));
        }
        if entry.view_type.is_empty() {
            return Err(PrefError::corrupt_entry(&storage_key, "empty view_type"));
        }
        Ok(Some(entry))
    }

    fn try_put(&self, key: &PreferenceKey, entry: &CacheEntry) -> PrefResult<()> {
        let raw = serde_json::to_string(entry)?;
        self.storage.set_item(&self.storage_key(key), raw)
    }
}
