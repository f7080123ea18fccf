//! Preference store backends for viewpref
//!
//! This crate provides:
//! - An in-memory store for tests and embedded hosts
//! - A JSON file store, one document per user
//! - Admin operations (list, clear) used by the CLI
//! - [`UserPreferenceService`], the user scoped RPC facade

pub mod error;
pub mod filter;
pub mod local;
pub mod memory;
pub mod record;
pub mod service;

pub use error::{StoreError, StoreResult};
pub use filter::PreferenceFilter;
pub use local::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;
pub use record::PreferenceRecord;
pub use service::{LastView, UserPreferenceService};

use async_trait::async_trait;
use viewpref_core::types::{PreferenceKey, UserId};

/// Administrative access to stored preferences
#[async_trait]
pub trait PreferenceAdmin: Send + Sync {
    /// Records matching the filter, most recently updated first
    async fn list(&self, filter: &PreferenceFilter) -> StoreResult<Vec<PreferenceRecord>>;

    /// Clear one preference
    async fn delete(&self, key: &PreferenceKey) -> StoreResult<()>;

    /// Clear every preference of a user, returning how many were removed
    async fn clear_user(&self, user_id: &UserId) -> StoreResult<usize>;

    /// Check if a preference exists
    async fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        let filter = PreferenceFilter::new()
            .with_user(key.user_id.clone())
            .with_model(key.model.clone());
        let records = self.list(&filter).await?;
        Ok(records.iter().any(|r| &r.key() == key))
    }
}
