//! Environment variable overrides
//!
//! Every override uses the `VIEWPREF_` prefix. Lookups go through a closure so
//! the same code serves the process environment and tests.

use std::path::PathBuf;

use super::model::{Config, LogFormat};
use crate::error::{PrefError, PrefResult};

pub const ENV_STORE_TIMEOUT_MS: &str = "VIEWPREF_STORE_TIMEOUT_MS";
pub const ENV_READINESS_TIMEOUT_MS: &str = "VIEWPREF_READINESS_TIMEOUT_MS";
pub const ENV_FLUSH_TIMEOUT_MS: &str = "VIEWPREF_FLUSH_TIMEOUT_MS";
pub const ENV_MODEL_FALLBACK: &str = "VIEWPREF_MODEL_FALLBACK";
pub const ENV_STORE_DIR: &str = "VIEWPREF_STORE_DIR";
pub const ENV_LOG_LEVEL: &str = "VIEWPREF_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "VIEWPREF_LOG_FORMAT";

/// Apply overrides from the process environment
pub fn load_from_env(config: &mut Config) -> PrefResult<()> {
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> PrefResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_STORE_TIMEOUT_MS) {
        config.engine.store_timeout_ms = parse_millis(ENV_STORE_TIMEOUT_MS, &value)?;
    }
    if let Some(value) = lookup(ENV_READINESS_TIMEOUT_MS) {
        config.engine.readiness_timeout_ms = parse_millis(ENV_READINESS_TIMEOUT_MS, &value)?;
    }
    if let Some(value) = lookup(ENV_FLUSH_TIMEOUT_MS) {
        config.engine.flush_timeout_ms = parse_millis(ENV_FLUSH_TIMEOUT_MS, &value)?;
    }
    if let Some(value) = lookup(ENV_MODEL_FALLBACK) {
        config.engine.model_fallback = parse_bool(&value).ok_or_else(|| {
            PrefError::config(format!("Invalid {} value: '{}'", ENV_MODEL_FALLBACK, value))
        })?;
    }
    if let Some(value) = lookup(ENV_STORE_DIR) {
        if !value.trim().is_empty() {
            config.store.dir = Some(PathBuf::from(value));
        }
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = value;
    }
    if let Some(value) = lookup(ENV_LOG_FORMAT) {
        config.logging.format = value
            .parse::<LogFormat>()
            .map_err(|e| PrefError::config(format!("Invalid {}: {}", ENV_LOG_FORMAT, e)))?;
    }
    Ok(())
}

fn parse_millis(name: &str, value: &str) -> PrefResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| PrefError::config(format!("Invalid {} value: '{}'", name, value)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
