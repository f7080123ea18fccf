//! File-based configuration loading

use std::fs;
use std::path::Path;

use super::model::Config;
use crate::error::{PrefError, PrefResult};

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> PrefResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        PrefError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            PrefError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            PrefError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            PrefError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Write configuration to a file, format picked by extension
pub fn save_to_file(config: &Config, path: &Path) -> PrefResult<()> {
    let content = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::to_string_pretty(config)?,
        Some("yaml") | Some("yml") => serde_yaml::to_string(config)?,
        _ => serde_json::to_string_pretty(config)?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
        .map_err(|e| PrefError::io_with_path(e.to_string(), path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewpref.json");
        fs::write(
            &path,
            r#"{
                "engine": {
                    "store_timeout_ms": 500,
                    "mode_aliases": {"board": "kanban"}
                },
                "logging": {"level": "debug", "format": "json"}
            }"#,
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.engine.store_timeout_ms, 500);
        assert_eq!(
            config.engine.mode_aliases.get("board").map(String::as_str),
            Some("kanban")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewpref.toml");
        fs::write(
            &path,
            "[engine]\nmodel_fallback = true\n\n[store]\ndir = \"/var/lib/viewpref\"\n",
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert!(config.engine.model_fallback);
        assert_eq!(
            config.store.dir.as_deref(),
            Some(Path::new("/var/lib/viewpref"))
        );
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewpref.yaml");
        fs::write(&path, "engine:\n  flush_timeout_ms: 10\n").unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.engine.flush_timeout_ms, 10);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ engine: ").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, PrefError::Config { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("viewpref.toml");
        let mut config = Config::default();
        config.engine.model_fallback = true;

        save_to_file(&config, &path).unwrap();
        assert_eq!(load_from_file(&path).unwrap(), config);
    }
}
