//! CLI commands

pub mod config;
pub mod navigate;
pub mod preference;

use std::sync::Arc;
use viewpref_core::config::Config;
use viewpref_core::error::PrefResult;
use viewpref_store::FilePreferenceStore;

/// File store at the configured location
pub(crate) fn open_store(config: &Config) -> PrefResult<Arc<FilePreferenceStore>> {
    let store = FilePreferenceStore::from_config(&config.store)?;
    tracing::debug!("Using preference store at {}", store.base_path().display());
    Ok(Arc::new(store))
}
