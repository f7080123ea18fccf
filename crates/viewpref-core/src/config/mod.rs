//! Configuration for the view preference engine
//!
//! Configuration is assembled in three steps: a file (JSON, TOML or YAML,
//! picked by extension), then `VIEWPREF_*` environment overrides, then
//! validation. A missing file yields the defaults.

pub mod env_loader;
pub mod file_loader;
pub mod loader;
pub mod model;
pub mod timeouts;
pub mod validation;

pub use env_loader::{apply_env_overrides, load_from_env};
pub use file_loader::{load_from_file, save_to_file};
pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE, load_config};
pub use model::{Config, EngineConfig, LogFormat, LoggingConfig, StoreConfig};
pub use validation::{validate, validate_engine};
