//! Core error types and traits

use thiserror::Error;

/// Result type alias for engine operations
pub type PrefResult<T> = Result<T, PrefError>;

/// Common accessors implemented by every error in the workspace.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> PrefResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> PrefResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> PrefResult<T> {
        self.map_err(|e| PrefError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> PrefResult<T> {
        self.map_err(|e| PrefError::other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with context message
    fn context<C: std::fmt::Display>(self, context: C) -> PrefResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context<C: std::fmt::Display>(self, context: C) -> PrefResult<T> {
        self.ok_or_else(|| PrefError::other(context.to_string()))
    }
}

/// Main error type for the preference engine
#[derive(Error, Debug, Clone)]
pub enum PrefError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The durable preference store failed or refused the call
    #[error("Preference store error: {message}")]
    Store {
        message: String,
        retryable: bool,
        context: Option<String>,
    },

    /// The session key-value storage backing the local cache failed
    #[error("Session storage error: {message}")]
    Storage {
        message: String,
        context: Option<String>,
    },

    /// A cached value could not be parsed
    #[error("Corrupt cache entry '{key}': {message}")]
    CorruptEntry { key: String, message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Invalid input
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// An awaited operation did not finish in time
    #[error("{operation} timed out after {millis} ms")]
    Timeout {
        operation: String,
        millis: u64,
        context: Option<String>,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        context: Option<String>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}
