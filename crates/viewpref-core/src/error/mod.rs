//! Error types for the view preference engine
//!
//! Every error carries an error code and an optional context string so that
//! callers swallowing a failure at a boundary can still log something useful.
//! The engine itself never surfaces these errors to the navigating user; they
//! exist for the store, cache and configuration layers and for the CLI.

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{OptionExt, PrefError, PrefResult, ResultExt, UnifiedError};
