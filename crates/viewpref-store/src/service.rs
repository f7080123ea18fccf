//! User scoped preference service
//!
//! The RPC surface a remote host talks to: every call is implicitly scoped
//! to the user the service was opened for.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use viewpref_core::error::PrefResult;
use viewpref_core::mode::ModeNormalizer;
use viewpref_core::store::PreferenceStore;
use viewpref_core::types::{Preference, PreferenceKey, UserId};

/// Last view answer returned to hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastView {
    pub view_type: String,
    pub model_name: String,
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
}

impl From<Preference> for LastView {
    fn from(preference: Preference) -> Self {
        Self {
            view_type: preference.mode.as_str().to_string(),
            model_name: preference.model,
            action_id: preference.action_id,
            action_name: preference.action_name,
        }
    }
}

pub struct UserPreferenceService {
    user_id: UserId,
    store: Arc<dyn PreferenceStore>,
    normalizer: ModeNormalizer,
}

impl UserPreferenceService {
    pub fn new(user_id: impl Into<UserId>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            normalizer: ModeNormalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ModeNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Most recently written preference for `model`, across actions
    pub async fn get_last_view_for_model(&self, model: &str) -> PrefResult<Option<LastView>> {
        if model.trim().is_empty() {
            return Ok(None);
        }
        let latest = self.store.latest_for_model(&self.user_id, model).await?;
        Ok(latest.map(|p| self.to_last_view(p)))
    }

    /// Preference for exactly one entry point
    pub async fn get_last_view(
        &self,
        model: &str,
        action_id: Option<&str>,
    ) -> PrefResult<Option<LastView>> {
        if model.trim().is_empty() {
            return Ok(None);
        }
        let key = PreferenceKey::new(self.user_id.clone(), model, action_id);
        let found = self.store.get(&key).await?;
        Ok(found.map(|p| self.to_last_view(p)))
    }

    /// Upsert the last view. `false` on empty input or any store failure.
    pub async fn save_last_view(
        &self,
        model: &str,
        view_type: &str,
        action_id: Option<&str>,
        action_name: Option<&str>,
    ) -> bool {
        if model.trim().is_empty() || view_type.trim().is_empty() {
            debug!("Refusing to save an empty last view");
            return false;
        }

        let key = PreferenceKey::new(self.user_id.clone(), model, action_id);
        let mode = self.normalizer.normalize(view_type.trim());
        let preference = Preference::new(key, mode).with_action_name(action_name.map(str::to_string));
        match self.store.save(&preference).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Error saving view preference for {}: {}", model, e);
                false
            }
        }
    }

    fn to_last_view(&self, mut preference: Preference) -> LastView {
        preference.mode = self.normalizer.normalize(preference.mode.as_str());
        LastView::from(preference)
    }
}
