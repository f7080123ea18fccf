//! From trait implementations for PrefError conversions

use super::types::PrefError;

impl From<std::io::Error> for PrefError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for PrefError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for PrefError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.to_string(), "Parsing TOML configuration")
    }
}

impl From<toml::ser::Error> for PrefError {
    fn from(error: toml::ser::Error) -> Self {
        Self::config_with_context(error.to_string(), "Serializing TOML configuration")
    }
}

impl From<serde_yaml::Error> for PrefError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_with_context(error.to_string(), "Parsing YAML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnifiedError;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PrefError = io.into();
        assert_eq!(err.error_code(), "VIEWPREF_IO");
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PrefError = parse.into();
        assert!(matches!(err, PrefError::Json { .. }));
    }
}
