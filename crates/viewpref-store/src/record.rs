//! Persisted preference records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use viewpref_core::types::{Preference, PreferenceKey};

/// A preference as the stores keep it, with bookkeeping timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(flatten)]
    pub preference: Preference,
    pub created_at: DateTime<Utc>,
    /// Last time the record was written
    pub last_accessed: DateTime<Utc>,
}

impl PreferenceRecord {
    pub fn new(preference: Preference) -> Self {
        let now = Utc::now();
        Self {
            preference,
            created_at: now,
            last_accessed: now,
        }
    }

    pub fn key(&self) -> PreferenceKey {
        self.preference.key()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.preference.updated_at
    }

    /// Replace the stored preference, keeping the creation time
    pub fn update(&mut self, preference: Preference) {
        self.preference = preference;
        self.last_accessed = Utc::now();
    }
}

/// Upsert `preference` into `records` on its key
pub(crate) fn upsert(records: &mut Vec<PreferenceRecord>, preference: &Preference) {
    let key = preference.key();
    match records.iter_mut().find(|r| r.key() == key) {
        Some(record) => record.update(preference.clone()),
        None => records.push(PreferenceRecord::new(preference.clone())),
    }
}

/// Whether a save carries enough to be stored
pub(crate) fn is_storable(preference: &Preference) -> bool {
    !preference.model.trim().is_empty() && !preference.mode.as_str().trim().is_empty()
}

/// Sort newest first, ties broken by key for stable output
pub(crate) fn sort_newest_first(records: &mut [PreferenceRecord]) {
    records.sort_by(|a, b| {
        b.updated_at()
            .cmp(&a.updated_at())
            .then_with(|| a.key().cmp(&b.key()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewpref_core::mode::CanonicalMode;

    fn preference(action: &str, mode: &str) -> Preference {
        Preference::new(
            PreferenceKey::new("7", "crm.lead", Some(action)),
            CanonicalMode::from_canonical(mode),
        )
    }

    #[test]
    fn test_upsert_keeps_created_at() {
        let mut records = Vec::new();
        upsert(&mut records, &preference("42", "kanban"));
        let created = records[0].created_at;

        upsert(&mut records, &preference("42", "list"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].preference.mode, "list");
        assert_eq!(records[0].created_at, created);

        upsert(&mut records, &preference("43", "form"));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = PreferenceRecord::new(preference("42", "list"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["model"], "crm.lead");
        assert_eq!(value["mode"], "list");
        assert!(value.get("created_at").is_some());

        let back: PreferenceRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
