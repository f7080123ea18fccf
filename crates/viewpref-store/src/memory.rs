//! In-memory preference store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use viewpref_core::error::PrefResult;
use viewpref_core::store::PreferenceStore;
use viewpref_core::types::{Preference, PreferenceKey, UserId};

use crate::record::{PreferenceRecord, is_storable};
use crate::{PreferenceAdmin, PreferenceFilter, StoreError, StoreResult};

/// Preferences kept in process memory; lost on exit
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    records: RwLock<HashMap<PreferenceKey, PreferenceRecord>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing preferences
    pub fn with_preferences(preferences: impl IntoIterator<Item = Preference>) -> Self {
        let records = preferences
            .into_iter()
            .map(|p| (p.key(), PreferenceRecord::new(p)))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &PreferenceKey) -> PrefResult<Option<Preference>> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .map(|r| r.preference.clone()))
    }

    async fn save(&self, preference: &Preference) -> PrefResult<bool> {
        if !is_storable(preference) {
            return Ok(false);
        }
        let key = preference.key();
        let mut records = self.records.write().await;
        match records.get_mut(&key) {
            Some(record) => record.update(preference.clone()),
            None => {
                records.insert(key.clone(), PreferenceRecord::new(preference.clone()));
            }
        }
        debug!("Stored '{}' for {}", preference.mode, key);
        Ok(true)
    }

    async fn latest_for_model(
        &self,
        user_id: &UserId,
        model: &str,
    ) -> PrefResult<Option<Preference>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| &r.preference.user_id == user_id && r.preference.model == model)
            .max_by_key(|r| r.updated_at())
            .map(|r| r.preference.clone()))
    }
}

#[async_trait]
impl PreferenceAdmin for MemoryPreferenceStore {
    async fn list(&self, filter: &PreferenceFilter) -> StoreResult<Vec<PreferenceRecord>> {
        let records = self.records.read().await;
        Ok(filter.apply(records.values().cloned()))
    }

    async fn delete(&self, key: &PreferenceKey) -> StoreResult<()> {
        match self.records.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn clear_user(&self, user_id: &UserId) -> StoreResult<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|key, _| &key.user_id != user_id);
        Ok(before - records.len())
    }
}
