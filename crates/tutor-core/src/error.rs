//! Error types for the tutor pipeline.

use thiserror::Error;

/// A shared error type for the tutor workspace.
///
/// Retrieval and model failures are recovered locally by the pipeline, so in
/// practice this type surfaces configuration and storage problems to the
/// drivers.
#[derive(Error, Debug, Clone)]
pub enum TutorError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error (missing project id, invalid credentials, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vector store or embedding failure
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Model transport or response failure
    #[error("Model error: {0}")]
    Model(String),

    /// Prompt template rendering failure
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid user-supplied value (unknown grade key, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TutorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Creates a Model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a config error
    ///
    /// Configuration errors are fatal for a session; every other kind is
    /// recovered by the pipeline.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a retrieval error
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TutorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TutorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TutorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for TutorError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

/// Conversion from anyhow::Error
impl From<anyhow::Error> for TutorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, TutorError>`.
pub type Result<T> = std::result::Result<T, TutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        let err = TutorError::not_found("collection", "grade_1_math_coll");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Entity not found: collection 'grade_1_math_coll'"
        );

        assert!(TutorError::config("missing GCP_PROJECT_ID").is_config());
        assert!(TutorError::retrieval("chroma unreachable").is_retrieval());
        assert!(!TutorError::model("timeout").is_config());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: TutorError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "secrets.toml");
        let err: TutorError = io.into();
        match err {
            TutorError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
