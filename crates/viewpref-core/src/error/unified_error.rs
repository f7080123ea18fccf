//! UnifiedError trait implementation for PrefError

use super::types::{PrefError, UnifiedError};

impl UnifiedError for PrefError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "VIEWPREF_CONFIG",
            Self::Store { .. } => "VIEWPREF_STORE",
            Self::Storage { .. } => "VIEWPREF_STORAGE",
            Self::CorruptEntry { .. } => "VIEWPREF_CORRUPT_ENTRY",
            Self::Io { .. } => "VIEWPREF_IO",
            Self::Json { .. } => "VIEWPREF_JSON",
            Self::InvalidInput { .. } => "VIEWPREF_INVALID_INPUT",
            Self::Timeout { .. } => "VIEWPREF_TIMEOUT",
            Self::NotFound { .. } => "VIEWPREF_NOT_FOUND",
            Self::Other { .. } => "VIEWPREF_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::Store { message, .. } => message,
            Self::Storage { message, .. } => message,
            Self::CorruptEntry { message, .. } => message,
            Self::Io { message, .. } => message,
            Self::Json { message, .. } => message,
            Self::InvalidInput { message, .. } => message,
            Self::Timeout { operation, .. } => operation,
            Self::NotFound { message, .. } => message,
            Self::Other { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Store { context, .. } => context.as_deref(),
            Self::Storage { context, .. } => context.as_deref(),
            Self::CorruptEntry { .. } => None,
            Self::Io { context, .. } => context.as_deref(),
            Self::Json { context, .. } => context.as_deref(),
            Self::InvalidInput { context, .. } => context.as_deref(),
            Self::Timeout { context, .. } => context.as_deref(),
            Self::NotFound { context, .. } => context.as_deref(),
            Self::Other { context, .. } => context.as_deref(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Store { retryable, .. } => *retryable,
            Self::Timeout { .. } | Self::Io { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PrefError::config("x").error_code(), "VIEWPREF_CONFIG");
        assert_eq!(
            PrefError::corrupt_entry("k", "bad").error_code(),
            "VIEWPREF_CORRUPT_ENTRY"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(PrefError::store_unavailable("offline").is_retryable());
        assert!(!PrefError::store_rejected("access denied").is_retryable());
        assert!(PrefError::timeout("store lookup", 2000).is_retryable());
        assert!(!PrefError::invalid_input("empty model").is_retryable());
    }

    #[test]
    fn test_with_context() {
        let err = PrefError::storage("quota exceeded").with_context("writing view_pref_7_crm.lead_42");
        assert_eq!(err.context(), Some("writing view_pref_7_crm.lead_42"));
        assert_eq!(err.message(), "quota exceeded");
    }
}
