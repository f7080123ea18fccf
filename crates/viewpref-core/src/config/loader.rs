//! Configuration assembly: file, environment, validation

use std::path::{Path, PathBuf};
use tracing::debug;

use super::env_loader::apply_env_overrides;
use super::file_loader::load_from_file;
use super::model::Config;
use super::validation::validate;
use crate::error::PrefResult;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "viewpref.toml";

/// Builder that assembles a [`Config`] from its sources
pub struct ConfigLoader {
    file: Option<PathBuf>,
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Read this file before applying environment overrides
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skip `VIEWPREF_*` environment overrides
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn load(self) -> PrefResult<Config> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) but reads the environment through `lookup`
    pub fn load_with_env<F>(self, lookup: F) -> PrefResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                load_from_file(path)?
            }
            None => Config::default(),
        };

        if self.use_env {
            apply_env_overrides(&mut config, lookup)?;
        }

        validate(&config)?;
        Ok(config)
    }
}

/// Load configuration from `path` and the process environment
pub fn load_config(path: impl AsRef<Path>) -> PrefResult<Config> {
    ConfigLoader::new().with_file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env_loader::ENV_STORE_TIMEOUT_MS;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewpref.json");
        fs::write(&path, r#"{"engine": {"store_timeout_ms": 900}}"#).unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .load_with_env(|name| (name == ENV_STORE_TIMEOUT_MS).then(|| "300".to_string()))
            .unwrap();
        assert_eq!(config.engine.store_timeout_ms, 300);
    }

    #[test]
    fn test_without_env_ignores_environment() {
        let config = ConfigLoader::new()
            .without_env()
            .load_with_env(|_| Some("not a number".to_string()))
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewpref.json");
        fs::write(&path, r#"{"engine": {"store_timeout_ms": 0}}"#).unwrap();

        assert!(
            ConfigLoader::new()
                .with_file(&path)
                .without_env()
                .load()
                .is_err()
        );
    }
}
