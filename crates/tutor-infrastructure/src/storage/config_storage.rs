//! Config file storage.
//!
//! `config.toml` is optional: a missing file yields [`TutorConfig::default`].

use std::fs;
use std::path::PathBuf;

use tutor_core::TutorError;
use tutor_core::config::TutorConfig;

use crate::paths::TutorPaths;

/// Errors that can occur while loading the config file.
#[derive(Debug)]
pub enum ConfigStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    TomlParseError(toml::de::Error),
    /// An environment override had an unusable value.
    InvalidOverride(String),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigStorageError::TomlParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigStorageError::InvalidOverride(e) => write!(f, "Invalid override: {}", e),
            ConfigStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for ConfigStorageError {}

impl From<std::io::Error> for ConfigStorageError {
    fn from(e: std::io::Error) -> Self {
        ConfigStorageError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigStorageError {
    fn from(e: toml::de::Error) -> Self {
        ConfigStorageError::TomlParseError(e)
    }
}

impl From<ConfigStorageError> for TutorError {
    fn from(e: ConfigStorageError) -> Self {
        match e {
            ConfigStorageError::IoError(io) => TutorError::from(io),
            other => TutorError::config(other.to_string()),
        }
    }
}

pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage for the default path (`~/.config/smart-tutor/config.toml`).
    pub fn new() -> Result<Self, ConfigStorageError> {
        let path = TutorPaths::config_file().map_err(|_| ConfigStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing and `--config`).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the file, or returns defaults when it does not exist.
    pub fn load(&self) -> Result<TutorConfig, ConfigStorageError> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(TutorConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the file and applies `TUTOR_*` overrides from `lookup`.
    pub fn load_with_overrides<F>(&self, lookup: F) -> Result<TutorConfig, ConfigStorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load()?;
        config
            .apply_env_overrides(lookup)
            .map_err(|e| ConfigStorageError::InvalidOverride(e.to_string()))?;
        Ok(config)
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load_from_env(&self) -> Result<TutorConfig, ConfigStorageError> {
        self.load_with_overrides(|key| std::env::var(key).ok())
    }
}
