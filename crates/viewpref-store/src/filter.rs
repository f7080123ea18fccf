//! Filter criteria for listing preferences

use viewpref_core::types::UserId;

use crate::record::PreferenceRecord;

/// Filter criteria for preference listing
#[derive(Debug, Default, Clone)]
pub struct PreferenceFilter {
    /// Filter by user
    pub user_id: Option<UserId>,

    /// Filter by model
    pub model: Option<String>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl PreferenceFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a record matches this filter
    pub fn matches(&self, record: &PreferenceRecord) -> bool {
        if let Some(ref user_id) = self.user_id {
            if &record.preference.user_id != user_id {
                return false;
            }
        }

        if let Some(ref model) = self.model {
            if &record.preference.model != model {
                return false;
            }
        }

        true
    }

    /// Filter, sort newest first and truncate
    pub(crate) fn apply(&self, records: impl IntoIterator<Item = PreferenceRecord>) -> Vec<PreferenceRecord> {
        let mut matched: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        crate::record::sort_newest_first(&mut matched);
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}
