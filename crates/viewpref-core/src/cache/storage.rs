//! Session scoped string storage backing the local cache

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{PrefError, PrefResult};

/// String key-value storage that lives as long as the user session
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> PrefResult<Option<String>>;

    fn set_item(&self, key: &str, value: String) -> PrefResult<()>;

    fn remove_item(&self, key: &str) -> PrefResult<()>;

    /// All keys currently stored
    fn keys(&self) -> PrefResult<Vec<String>>;
}

/// In-memory session storage with an optional byte quota
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes that would push keys plus values past `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn used_bytes(items: &HashMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> PrefResult<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> PrefResult<()> {
        let mut items = self.items.write();
        if let Some(quota) = self.quota_bytes {
            let replaced = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = Self::used_bytes(&items) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(PrefError::storage(format!(
                    "quota of {} bytes exceeded writing '{}'",
                    quota, key
                )));
            }
        }
        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> PrefResult<()> {
        self.items.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> PrefResult<Vec<String>> {
        Ok(self.items.read().keys().cloned().collect())
    }
}
