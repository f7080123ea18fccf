//! View mode identifiers and alias normalization
//!
//! Hosts name the same presentation in more than one way (`tree` and `list`
//! both denote the tabular view). Everything the engine stores, compares or
//! caches goes through [`ModeNormalizer`] first so that aliases never leak
//! into persisted records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PrefError, PrefResult};

/// Canonical identifier of the tabular mode
pub const LIST: &str = "list";
/// Canonical identifier of the single record mode
pub const FORM: &str = "form";
/// Canonical identifier of the card board mode
pub const KANBAN: &str = "kanban";

/// Modes the engine knows by name. Unknown modes are still accepted.
pub const KNOWN_MODES: &[&str] = &[
    LIST, KANBAN, FORM, "calendar", "pivot", "graph", "activity", "map", "gantt",
];

/// Aliases every normalizer applies
const BUILTIN_ALIASES: &[(&str, &str)] = &[("tree", LIST)];

/// A de-aliased mode identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMode(String);

impl CanonicalMode {
    /// Wrap an identifier that is already known to be canonical.
    ///
    /// Prefer [`normalize`] for anything that comes from a host or a store.
    pub fn from_canonical(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_form(&self) -> bool {
        self.0 == FORM
    }

    pub fn is_known(&self) -> bool {
        KNOWN_MODES.contains(&self.0.as_str())
    }
}

impl fmt::Display for CanonicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CanonicalMode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalMode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Maps mode aliases onto their canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeNormalizer {
    aliases: BTreeMap<String, String>,
}

impl Default for ModeNormalizer {
    fn default() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

impl ModeNormalizer {
    /// Normalizer with the built-in aliases plus `extra`.
    ///
    /// Rejects tables that would break idempotence: an alias pointing at
    /// itself, or an alias whose target is another alias.
    pub fn with_aliases(extra: &BTreeMap<String, String>) -> PrefResult<Self> {
        let mut normalizer = Self::default();
        for (alias, canonical) in extra {
            let alias = alias.trim();
            let canonical = canonical.trim();
            if alias.is_empty() || canonical.is_empty() {
                return Err(PrefError::invalid_field(
                    "mode_aliases",
                    "alias and target must be non-empty",
                ));
            }
            if alias == canonical {
                return Err(PrefError::invalid_field(
                    "mode_aliases",
                    format!("'{}' is aliased to itself", alias),
                ));
            }
            normalizer
                .aliases
                .insert(alias.to_string(), canonical.to_string());
        }

        for (alias, canonical) in &normalizer.aliases {
            if normalizer.aliases.contains_key(canonical) {
                return Err(PrefError::invalid_field(
                    "mode_aliases",
                    format!(
                        "'{}' maps to '{}', which is itself an alias",
                        alias, canonical
                    ),
                ));
            }
        }

        Ok(normalizer)
    }

    /// Canonical form of `mode_id`. Unknown identifiers pass through.
    pub fn normalize(&self, mode_id: &str) -> CanonicalMode {
        match self.aliases.get(mode_id) {
            Some(canonical) => CanonicalMode(canonical.clone()),
            None => CanonicalMode(mode_id.to_string()),
        }
    }

    pub fn is_alias(&self, mode_id: &str) -> bool {
        self.aliases.contains_key(mode_id)
    }
}

/// Normalize with the built-in alias table only.
pub fn normalize(mode_id: &str) -> CanonicalMode {
    ModeNormalizer::default().normalize(mode_id)
}
