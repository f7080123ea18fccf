//! Serialized form of a cached preference
//!
//! The JSON shape (`model_name`, `view_type`, `action_id`, `action_name`,
//! `timestamp`) is shared with other clients of the same session storage,
//! some of which write `action_id` as a number or as `false`.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::mode::ModeNormalizer;
use crate::types::{Preference, PreferenceKey, UserId};

/// A preference as held in the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub model_name: String,
    pub view_type: String,
    #[serde(default, deserialize_with = "deserialize_action_id")]
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    /// When the upstream record was last written, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When this entry was cached
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn from_preference(preference: &Preference) -> Self {
        Self {
            model_name: preference.model.clone(),
            view_type: preference.mode.to_string(),
            action_id: preference.action_id.clone(),
            action_name: preference.action_name.clone(),
            updated_at: Some(preference.updated_at),
            timestamp: Utc::now(),
        }
    }

    /// Whether this entry was written for `key`'s entry point
    pub fn matches(&self, key: &PreferenceKey) -> bool {
        self.model_name == key.model && self.action_id == key.action_id
    }

    /// Rebuild the preference, normalizing the stored mode
    pub fn to_preference(&self, user_id: UserId, normalizer: &ModeNormalizer) -> Preference {
        Preference {
            user_id,
            model: self.model_name.clone(),
            action_id: self.action_id.clone(),
            action_name: self.action_name.clone(),
            mode: normalizer.normalize(&self.view_type),
            updated_at: self.updated_at.unwrap_or(self.timestamp),
        }
    }
}

fn deserialize_action_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "action_id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::normalize;

    #[test]
    fn test_numeric_action_id_accepted() {
        let entry: CacheEntry = serde_json::from_str(
            r#"{"model_name":"crm.lead","view_type":"tree","action_id":42,"timestamp":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.action_id.as_deref(), Some("42"));
        assert!(entry.updated_at.is_none());
    }

    #[test]
    fn test_false_action_id_is_none() {
        let entry: CacheEntry = serde_json::from_str(
            r#"{"model_name":"res.partner","view_type":"kanban","action_id":false,"timestamp":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(entry.action_id.is_none());
    }

    #[test]
    fn test_object_action_id_rejected() {
        let parsed = serde_json::from_str::<CacheEntry>(
            r#"{"model_name":"m","view_type":"list","action_id":{"id":1},"timestamp":"2024-05-01T10:00:00Z"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let key = PreferenceKey::new("7", "crm.lead", Some("42"));
        let pref = Preference::new(key, normalize("list"));
        let value = serde_json::to_value(CacheEntry::from_preference(&pref)).unwrap();

        assert_eq!(value["model_name"], "crm.lead");
        assert_eq!(value["view_type"], "list");
        assert_eq!(value["action_id"], "42");
        assert!(value.get("action_name").is_none());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_to_preference_normalizes() {
        let entry = CacheEntry {
            model_name: "crm.lead".to_string(),
            view_type: "tree".to_string(),
            action_id: Some("42".to_string()),
            action_name: Some("Leads".to_string()),
            updated_at: None,
            timestamp: Utc::now(),
        };
        let pref = entry.to_preference(UserId::from("7"), &ModeNormalizer::default());
        assert_eq!(pref.mode, "list");
        assert_eq!(pref.updated_at, entry.timestamp);
        assert!(entry.matches(&PreferenceKey::new("7", "crm.lead", Some("42"))));
        assert!(!entry.matches(&PreferenceKey::without_action("7", "crm.lead")));
    }
}
