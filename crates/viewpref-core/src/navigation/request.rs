//! The in-flight description of what the host is about to show

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mode::{CanonicalMode, ModeNormalizer};
use crate::types::{PreferenceKey, UserId};

/// One presentation mode offered by an entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDescriptor {
    /// Identifier as the host spelled it
    pub id: String,
    pub canonical_id: CanonicalMode,
    /// Whether the host can open the entry point directly in this mode
    #[serde(default = "default_primary_capable")]
    pub is_primary_capable: bool,
    /// Host view reference, if a specific view was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<u64>,
}

fn default_primary_capable() -> bool {
    true
}

impl ModeDescriptor {
    pub fn new(id: impl Into<String>, normalizer: &ModeNormalizer) -> Self {
        let id = id.into();
        Self {
            canonical_id: normalizer.normalize(&id),
            id,
            is_primary_capable: true,
            view_id: None,
        }
    }

    /// Mode that can be offered but never opened first (a search panel, say)
    pub fn secondary(id: impl Into<String>, normalizer: &ModeNormalizer) -> Self {
        Self {
            is_primary_capable: false,
            ..Self::new(id, normalizer)
        }
    }

    pub fn with_view_id(mut self, view_id: u64) -> Self {
        self.view_id = Some(view_id);
        self
    }
}

/// A request to open an entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub model: String,
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    /// Ordered; index 0 is rendered first
    pub available_modes: Vec<ModeDescriptor>,
    #[serde(default)]
    pub primary_mode: Option<CanonicalMode>,
    #[serde(default)]
    pub directives: BTreeMap<String, String>,
    /// Set when the request opens one specific record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// The caller already chose the mode; leave the request alone
    #[serde(default)]
    pub skip_preference: bool,
}

impl NavigationRequest {
    pub fn new(model: impl Into<String>, action_id: Option<impl Into<String>>) -> Self {
        Self {
            model: model.into(),
            action_id: action_id.map(Into::into),
            action_name: None,
            available_modes: Vec::new(),
            primary_mode: None,
            directives: BTreeMap::new(),
            record_id: None,
            skip_preference: false,
        }
    }

    /// Request whose modes are given as host identifiers, in order
    pub fn with_modes<I, S>(mut self, modes: I, normalizer: &ModeNormalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_modes = modes
            .into_iter()
            .map(|id| ModeDescriptor::new(id, normalizer))
            .collect();
        self
    }

    pub fn with_mode(mut self, descriptor: ModeDescriptor) -> Self {
        self.available_modes.push(descriptor);
        self
    }

    pub fn with_action_name(mut self, name: impl Into<String>) -> Self {
        self.action_name = Some(name.into());
        self
    }

    pub fn with_directive(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(key.into(), value.into());
        self
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn skipping_preference(mut self) -> Self {
        self.skip_preference = true;
        self
    }

    /// Preference key for this entry point as seen by `user_id`
    pub fn preference_key(&self, user_id: &UserId) -> PreferenceKey {
        PreferenceKey {
            user_id: user_id.clone(),
            model: self.model.clone(),
            action_id: self.action_id.clone(),
        }
    }

    /// Whether the preference engine should look at this request at all
    pub fn accepts_override(&self) -> bool {
        !self.skip_preference && self.record_id.is_none() && !self.model.is_empty()
    }

    pub fn position_of(&self, mode: &CanonicalMode) -> Option<usize> {
        self.available_modes
            .iter()
            .position(|d| &d.canonical_id == mode)
    }

    /// Canonical mode order as a comma separated list
    pub fn view_mode(&self) -> String {
        self.available_modes
            .iter()
            .map(|d| d.canonical_id.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Distinct values asserted by forced-mode directives
    pub fn forced_modes(&self) -> Vec<&str> {
        let mut values: Vec<&str> = super::FORCED_MODE_DIRECTIVES
            .iter()
            .filter_map(|k| self.directives.get(*k).map(String::as_str))
            .collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// True when two directives force different modes
    pub fn has_conflicting_directives(&self) -> bool {
        self.forced_modes().len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ModeNormalizer {
        ModeNormalizer::default()
    }

    #[test]
    fn test_descriptors_are_normalized() {
        let request =
            NavigationRequest::new("crm.lead", Some("42")).with_modes(["kanban", "tree", "form"], &normalizer());
        assert_eq!(request.view_mode(), "kanban,list,form");
        assert_eq!(request.available_modes[1].id, "tree");
    }

    #[test]
    fn test_accepts_override() {
        let base = NavigationRequest::new("crm.lead", Some("42"));
        assert!(base.accepts_override());
        assert!(!base.clone().with_record("17").accepts_override());
        assert!(!base.clone().skipping_preference().accepts_override());
        assert!(!NavigationRequest::new("", None::<String>).accepts_override());
    }

    #[test]
    fn test_conflicting_directives() {
        let request = NavigationRequest::new("crm.lead", None::<String>)
            .with_directive("view_type", "kanban")
            .with_directive("default_view_type", "list");
        assert!(request.has_conflicting_directives());

        let agreeing = NavigationRequest::new("crm.lead", None::<String>)
            .with_directive("view_type", "list")
            .with_directive("force_view_type", "list")
            .with_directive("search_default_mine", "1");
        assert!(!agreeing.has_conflicting_directives());
    }

    #[test]
    fn test_preference_key() {
        let request = NavigationRequest::new("crm.lead", Some("42"));
        let key = request.preference_key(&UserId::from("7"));
        assert_eq!(key.to_string(), "7/crm.lead/42");
    }

    #[test]
    fn test_deserialize_minimal_request() {
        let request: NavigationRequest = serde_json::from_str(
            r#"{"model":"crm.lead","available_modes":[{"id":"tree","canonical_id":"list"}]}"#,
        )
        .unwrap();
        assert!(request.available_modes[0].is_primary_capable);
        assert!(request.action_id.is_none());
        assert!(!request.skip_preference);
    }
}
