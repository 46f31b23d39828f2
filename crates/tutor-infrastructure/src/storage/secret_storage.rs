//! Secret configuration file storage.
//!
//! Loads `~/.config/smart-tutor/secrets.toml` (`GCP_PROJECT_ID`,
//! `GCP_LOCATION`, `GOOGLE_APPLICATION_CREDENTIALS_JSON`, ...).

use std::fs;
use std::path::PathBuf;

use tutor_core::config::SecretConfig;

use crate::paths::TutorPaths;

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Secrets file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    ParseError(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secrets file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            // toml errors quote the offending line, which may hold a secret.
            SecretStorageError::ParseError(e) => match e.span() {
                Some(span) => write!(f, "TOML parse error at byte {}", span.start),
                None => write!(f, "TOML parse error"),
            },
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<toml::de::Error> for SecretStorageError {
    fn from(e: toml::de::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Read-only storage for the secrets file.
///
/// Does not validate credentials; see [`SecretConfig::validate`].
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a storage for the default path (`~/.config/smart-tutor/secrets.toml`).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = TutorPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;

        Ok(config)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
