//! Local filesystem preference store
//!
//! Stores one JSON document per user in the user's home directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use viewpref_core::config::StoreConfig;
use viewpref_core::error::PrefResult;
use viewpref_core::store::PreferenceStore;
use viewpref_core::types::{Preference, PreferenceKey, UserId};

use crate::record::{PreferenceRecord, is_storable, upsert};
use crate::{PreferenceAdmin, PreferenceFilter, StoreError, StoreResult};

/// Everything stored for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    user_id: UserId,
    #[serde(default)]
    preferences: Vec<PreferenceRecord>,
}

impl UserDocument {
    fn empty(user_id: &UserId) -> Self {
        Self {
            user_id: user_id.clone(),
            preferences: Vec::new(),
        }
    }
}

/// Local filesystem preference store
///
/// Documents are stored as JSON files in:
/// - `~/.viewpref/preferences/` (default)
/// - Custom path if specified
pub struct FilePreferenceStore {
    /// Base directory for user documents
    base_path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    /// Create storage with default path (~/.viewpref/preferences)
    pub fn new() -> StoreResult<Self> {
        Self::from_config(&StoreConfig::default())
    }

    /// Create storage with custom base path
    pub fn with_path(base_path: PathBuf) -> Self {
        Self {
            base_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let base_path = config.resolved_dir().ok_or(StoreError::PathUnavailable)?;
        Ok(Self::with_path(base_path))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ensure storage directory exists
    async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// Get file path for a user
    fn user_path(&self, user_id: &UserId) -> StoreResult<PathBuf> {
        if user_id.as_str().trim().is_empty() {
            return Err(StoreError::InvalidData("empty user id".to_string()));
        }
        let mut stem = String::with_capacity(user_id.as_str().len());
        for byte in user_id.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                stem.push(byte as char);
            } else {
                // Percent-encode the rest; the mapping stays one-to-one
                stem.push_str(&format!("%{:02X}", byte));
            }
        }
        Ok(self.base_path.join(format!("{}.json", stem)))
    }

    async fn read_file(path: &Path) -> StoreResult<UserDocument> {
        let content = fs::read_to_string(path).await?;
        let document: UserDocument = serde_json::from_str(&content)?;
        Ok(document)
    }

    async fn read_document(&self, user_id: &UserId) -> StoreResult<UserDocument> {
        let path = self.user_path(user_id)?;
        if !fs::try_exists(&path).await? {
            return Ok(UserDocument::empty(user_id));
        }

        let document = Self::read_file(&path).await?;
        if &document.user_id != user_id {
            return Err(StoreError::InvalidData(format!(
                "{:?} belongs to user {}, not {}",
                path, document.user_id, user_id
            )));
        }
        Ok(document)
    }

    async fn write_document(&self, document: &UserDocument) -> StoreResult<()> {
        self.ensure_dir().await?;

        let path = self.user_path(&document.user_id)?;
        let content = serde_json::to_string_pretty(document)?;

        // Write then rename so a crash never leaves a half written document
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &path).await?;
        debug!(
            "Saved {} preference(s) for user {} to {:?}",
            document.preferences.len(),
            document.user_id,
            path
        );
        Ok(())
    }

    async fn upsert(&self, preference: &Preference) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document(&preference.user_id).await?;
        upsert(&mut document.preferences, preference);
        self.write_document(&document).await
    }

    async fn all_documents(&self) -> StoreResult<Vec<UserDocument>> {
        self.ensure_dir().await?;

        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut documents = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // Only process .json files
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            match Self::read_file(&path).await {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Failed to read preferences from {:?}: {}", path, e),
            }
        }

        Ok(documents)
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &PreferenceKey) -> PrefResult<Option<Preference>> {
        let document = self.read_document(&key.user_id).await?;
        Ok(document
            .preferences
            .into_iter()
            .find(|r| &r.key() == key)
            .map(|r| r.preference))
    }

    async fn save(&self, preference: &Preference) -> PrefResult<bool> {
        if !is_storable(preference) {
            return Ok(false);
        }
        self.upsert(preference).await?;
        Ok(true)
    }

    async fn latest_for_model(
        &self,
        user_id: &UserId,
        model: &str,
    ) -> PrefResult<Option<Preference>> {
        let document = self.read_document(user_id).await?;
        Ok(document
            .preferences
            .into_iter()
            .filter(|r| r.preference.model == model)
            .max_by_key(|r| r.updated_at())
            .map(|r| r.preference))
    }
}

#[async_trait]
impl PreferenceAdmin for FilePreferenceStore {
    async fn list(&self, filter: &PreferenceFilter) -> StoreResult<Vec<PreferenceRecord>> {
        let records = match filter.user_id {
            Some(ref user_id) => self.read_document(user_id).await?.preferences,
            None => self
                .all_documents()
                .await?
                .into_iter()
                .flat_map(|d| d.preferences)
                .collect(),
        };
        Ok(filter.apply(records))
    }

    async fn delete(&self, key: &PreferenceKey) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document(&key.user_id).await?;

        let Some(index) = document.preferences.iter().position(|r| &r.key() == key) else {
            return Err(StoreError::NotFound(key.to_string()));
        };
        document.preferences.remove(index);
        self.write_document(&document).await?;
        debug!("Deleted preference {}", key);

        Ok(())
    }

    async fn clear_user(&self, user_id: &UserId) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let path = self.user_path(user_id)?;
        if !fs::try_exists(&path).await? {
            return Ok(0);
        }

        let removed = self.read_document(user_id).await?.preferences.len();
        fs::remove_file(&path).await?;
        debug!("Cleared {} preference(s) for user {}", removed, user_id);

        Ok(removed)
    }
}
