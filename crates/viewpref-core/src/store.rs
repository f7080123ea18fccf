//! Durable preference store interface
//!
//! The engine only consumes this trait. Concrete backends (in-memory, JSON
//! files, a remote RPC client) live outside the core.

use async_trait::async_trait;

use crate::error::PrefResult;
use crate::types::{Preference, PreferenceKey, UserId};

/// Upstream source of truth for preferences
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preference stored for exactly this `(user, model, action)` triple
    async fn get(&self, key: &PreferenceKey) -> PrefResult<Option<Preference>>;

    /// Upsert on the preference's triple. `Ok(false)` means the store
    /// declined the write without failing.
    async fn save(&self, preference: &Preference) -> PrefResult<bool>;

    /// Most recently updated preference for the model, across all actions
    async fn latest_for_model(
        &self,
        _user_id: &UserId,
        _model: &str,
    ) -> PrefResult<Option<Preference>> {
        Ok(None)
    }
}
