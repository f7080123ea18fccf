//! Configuration data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::timeouts;

/// Default prefix of session storage keys
pub const DEFAULT_STORAGE_PREFIX: &str = "view_pref";

/// Top level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Engine behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on a preference store call, in milliseconds
    pub store_timeout_ms: u64,
    /// How long to wait for the host to report its active view
    pub readiness_timeout_ms: u64,
    /// Grace period for outstanding saves at session end
    pub flush_timeout_ms: u64,
    /// Fall back to the newest preference for the model when the
    /// `(user, model, action)` lookup misses
    pub model_fallback: bool,
    /// Additional mode aliases, alias -> canonical
    pub mode_aliases: BTreeMap<String, String>,
    /// Prefix of session storage keys
    pub storage_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: timeouts::STORE_CALL_MS,
            readiness_timeout_ms: timeouts::READINESS_MS,
            flush_timeout_ms: timeouts::SESSION_FLUSH_MS,
            model_fallback: false,
            mode_aliases: BTreeMap::new(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

/// Location of the file backed preference store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON document per user. `None` means
    /// `~/.viewpref/preferences`.
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(".viewpref").join("preferences"))
        })
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
        assert!(!config.model_fallback);
        assert_eq!(config.storage_prefix, "view_pref");
        assert!(config.mode_aliases.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"engine": {"model_fallback": true}}"#).unwrap();
        assert!(config.engine.model_fallback);
        assert_eq!(config.engine.flush_timeout_ms, timeouts::SESSION_FLUSH_MS);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_store_dir_override() {
        let store = StoreConfig {
            dir: Some(PathBuf::from("/tmp/prefs")),
        };
        assert_eq!(store.resolved_dir(), Some(PathBuf::from("/tmp/prefs")));
    }
}
