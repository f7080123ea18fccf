//! Identifiers and the durable preference record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mode::CanonicalMode;

/// Identifier of the user a preference belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendering of a missing action id in keys
const NO_ACTION: &str = "none";

/// The `(user, model, action)` triple every preference is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreferenceKey {
    pub user_id: UserId,
    pub model: String,
    pub action_id: Option<String>,
}

impl PreferenceKey {
    pub fn new(
        user_id: impl Into<UserId>,
        model: impl Into<String>,
        action_id: Option<impl Into<String>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            model: model.into(),
            action_id: action_id.map(Into::into),
        }
    }

    /// Key for an entry point reached without an action
    pub fn without_action(user_id: impl Into<UserId>, model: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            model: model.into(),
            action_id: None,
        }
    }

    pub fn action_str(&self) -> &str {
        self.action_id.as_deref().unwrap_or(NO_ACTION)
    }

    /// Key in the session storage backing the local cache,
    /// `<prefix>_<user>_<model>_<action>`.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            prefix,
            self.user_id,
            self.model,
            self.action_str()
        )
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.model, self.action_str())
    }
}

/// Durable record of the last mode a user opened an entry point with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: UserId,
    pub model: String,
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    pub mode: CanonicalMode,
    pub updated_at: DateTime<Utc>,
}

impl Preference {
    pub fn new(key: PreferenceKey, mode: CanonicalMode) -> Self {
        Self {
            user_id: key.user_id,
            model: key.model,
            action_id: key.action_id,
            action_name: None,
            mode,
            updated_at: Utc::now(),
        }
    }

    pub fn with_action_name(mut self, name: Option<String>) -> Self {
        self.action_name = name;
        self
    }

    pub fn key(&self) -> PreferenceKey {
        PreferenceKey {
            user_id: self.user_id.clone(),
            model: self.model.clone(),
            action_id: self.action_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_storage_key() {
        let key = PreferenceKey::new(7u64, "crm.lead", Some("42"));
        assert_eq!(key.to_string(), "7/crm.lead/42");
        assert_eq!(key.storage_key("view_pref"), "view_pref_7_crm.lead_42");
    }

    #[test]
    fn test_key_without_action() {
        let key = PreferenceKey::without_action("admin", "res.partner");
        assert_eq!(key.to_string(), "admin/res.partner/none");
        assert_eq!(key.storage_key("view_pref"), "view_pref_admin_res.partner_none");
    }

    #[test]
    fn test_preference_key_roundtrip() {
        let key = PreferenceKey::new("u", "sale.order", Some("9"));
        let pref = Preference::new(key.clone(), CanonicalMode::from_canonical("kanban"));
        assert_eq!(pref.key(), key);
        assert!(pref.action_name.is_none());
    }
}
