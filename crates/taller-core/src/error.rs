use thiserror::Error;

/// Top-level error type for the workshop dictation system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for TallerError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TallerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dictation error: {0}")]
    Dictation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TallerError {
    fn from(err: toml::de::Error) -> Self {
        TallerError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TallerError {
    fn from(err: toml::ser::Error) -> Self {
        TallerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TallerError {
    fn from(err: serde_json::Error) -> Self {
        TallerError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for workshop operations.
pub type Result<T> = std::result::Result<T, TallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases: Vec<(TallerError, &str)> = vec![
            (
                TallerError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                TallerError::Dictation("Sin audio".to_string()),
                "Dictation error: Sin audio",
            ),
            (
                TallerError::Extraction("servicio no disponible".to_string()),
                "Extraction error: servicio no disponible",
            ),
            (
                TallerError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TallerError = io_err.into();
        assert!(matches!(err, TallerError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let taller_err: TallerError = err.unwrap_err().into();
        assert!(matches!(taller_err, TallerError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let taller_err: TallerError = err.unwrap_err().into();
        assert!(matches!(taller_err, TallerError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
