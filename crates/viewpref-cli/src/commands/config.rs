//! Configuration management commands

use colored::*;
use std::path::Path;
use viewpref_core::config::{Config, ConfigLoader, load_from_file, save_to_file, validate as validate_config};
use viewpref_core::error::{PrefError, PrefResult};

use crate::console::CliConsole;

/// Show current configuration
pub async fn show(config_file: &str) -> PrefResult<()> {
    let console = CliConsole::new(true);

    console.print_header("Configuration");

    if !Path::new(config_file).exists() {
        console.warn(&format!("Configuration file not found: {config_file}"));
        console.info("Using default configuration");
    } else {
        console.success(&format!("Loaded configuration from: {config_file}"));
    }

    let config = ConfigLoader::new().with_file(config_file).load()?;
    print_config(&console, &config);
    Ok(())
}

/// Validate configuration
pub async fn validate(config_file: &str) -> PrefResult<()> {
    let console = CliConsole::new(true);

    console.print_header("Configuration Validation");

    if !Path::new(config_file).exists() {
        return Err(PrefError::config(format!(
            "Configuration file not found: {config_file}"
        )));
    }

    console.info(&format!("Validating configuration file: {config_file}"));

    let config = load_from_file(Path::new(config_file)).inspect_err(|e| {
        console.error(&format!("Failed to load configuration: {e}"));
    })?;
    console.success("Configuration file loaded successfully");

    match validate_config(&config) {
        Ok(()) => {
            console.success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            console.error(&format!("Configuration validation failed: {e}"));
            Err(e)
        }
    }
}

/// Write a default configuration file
pub async fn init(config_file: &str, force: bool) -> PrefResult<()> {
    let console = CliConsole::new(true);
    let path = Path::new(config_file);

    if path.exists() && !force {
        console.warn(&format!("Configuration file already exists: {config_file}"));
        console.info("Use --force to overwrite");
        return Ok(());
    }

    save_to_file(&Config::default(), path)?;
    console.success(&format!("Created configuration file: {config_file}"));
    Ok(())
}

fn print_config(console: &CliConsole, config: &Config) {
    println!();
    println!("{}", "Engine".bold());
    console.field("store_timeout_ms", config.engine.store_timeout_ms);
    console.field("readiness_timeout_ms", config.engine.readiness_timeout_ms);
    console.field("flush_timeout_ms", config.engine.flush_timeout_ms);
    console.field("model_fallback", config.engine.model_fallback);
    console.field("storage_prefix", &config.engine.storage_prefix);
    if config.engine.mode_aliases.is_empty() {
        console.field("mode_aliases", "(built-in only)".dimmed());
    } else {
        for (alias, target) in &config.engine.mode_aliases {
            console.field("mode_alias", format!("{} → {}", alias, target));
        }
    }

    println!();
    println!("{}", "Store".bold());
    match config.store.resolved_dir() {
        Some(dir) => console.field("dir", dir.display()),
        None => console.field("dir", "(unavailable)".red()),
    }

    println!();
    println!("{}", "Logging".bold());
    console.field("level", &config.logging.level);
    console.field("format", config.logging.format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_validate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("viewpref.toml");
        let path = path.to_str().unwrap();

        init(path, false).await.unwrap();
        assert!(Path::new(path).exists());
        validate(path).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("viewpref.toml");
        std::fs::write(&path, "[engine]\nstore_timeout_ms = 0\n").unwrap();

        assert!(validate(path.to_str().unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        assert!(validate("/nonexistent/viewpref.toml").await.is_err());
    }
}
