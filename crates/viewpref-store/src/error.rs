//! Store error type

use thiserror::Error;
use viewpref_core::error::PrefError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preference not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid preference data: {0}")]
    InvalidData(String),

    #[error("Storage path not available")]
    PathUnavailable,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for PrefError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(key) => PrefError::not_found(format!("preference {}", key)),
            StoreError::Io(e) => PrefError::store_unavailable(e.to_string()),
            StoreError::Serialization(e) => PrefError::store_rejected(e.to_string()),
            StoreError::InvalidData(message) => PrefError::store_rejected(message),
            StoreError::PathUnavailable => {
                PrefError::store_unavailable("storage path not available")
                    .with_context("no home directory and no store dir configured")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewpref_core::error::UnifiedError;

    #[test]
    fn test_io_errors_are_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only");
        let error: PrefError = StoreError::from(io).into();
        assert!(error.is_retryable());
    }

    #[test]
    fn test_bad_data_is_not_retryable() {
        let error: PrefError = StoreError::InvalidData("user mismatch".into()).into();
        assert!(!error.is_retryable());
        assert!(error.to_string().contains("user mismatch"));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let error: PrefError = StoreError::NotFound("7/crm.lead/42".into()).into();
        assert!(matches!(error, PrefError::NotFound { .. }));
    }
}
