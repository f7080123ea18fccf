//! Configuration validation

use super::model::{Config, EngineConfig};
use crate::error::{PrefError, PrefResult};
use crate::mode::ModeNormalizer;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Check a fully assembled configuration
pub fn validate(config: &Config) -> PrefResult<()> {
    validate_engine(&config.engine)?;

    // RUST_LOG style directives ("info,viewpref_core=debug") are accepted as is
    let level = config.logging.level.trim().to_ascii_lowercase();
    if !level.contains('=') && !level.contains(',') && !LOG_LEVELS.contains(&level.as_str()) {
        return Err(PrefError::invalid_field(
            "logging.level",
            format!("unknown log level '{}'", config.logging.level),
        ));
    }

    Ok(())
}

/// Check the settings the engine itself consumes
pub fn validate_engine(engine: &EngineConfig) -> PrefResult<()> {
    if engine.store_timeout_ms == 0 {
        return Err(PrefError::invalid_field(
            "engine.store_timeout_ms",
            "must be greater than zero",
        ));
    }
    if engine.readiness_timeout_ms == 0 {
        return Err(PrefError::invalid_field(
            "engine.readiness_timeout_ms",
            "must be greater than zero",
        ));
    }

    let prefix = engine.storage_prefix.trim();
    if prefix.is_empty() {
        return Err(PrefError::invalid_field(
            "engine.storage_prefix",
            "must not be empty",
        ));
    }
    if prefix.contains(char::is_whitespace) {
        return Err(PrefError::invalid_field(
            "engine.storage_prefix",
            "must not contain whitespace",
        ));
    }

    ModeNormalizer::with_aliases(&engine.mode_aliases)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_store_timeout_rejected() {
        let mut config = Config::default();
        config.engine.store_timeout_ms = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_alias_chain_rejected() {
        let mut config = Config::default();
        config
            .engine
            .mode_aliases
            .insert("grid".to_string(), "tree".to_string());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("alias"));
    }

    #[test]
    fn test_log_level_directives_accepted() {
        let mut config = Config::default();
        config.logging.level = "info,viewpref_core=debug".to_string();
        assert!(validate(&config).is_ok());

        config.logging.level = "loud".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let mut config = Config::default();
        config.engine.storage_prefix = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
