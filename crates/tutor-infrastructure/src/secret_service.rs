//! Secret service implementation.
//!
//! Reads `secrets.toml` once, fills missing keys from the environment and
//! caches the result.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use tutor_core::config::SecretConfig;
use tutor_core::secret::SecretService;

use crate::storage::{SecretStorage, SecretStorageError};

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Service for loading cloud credentials.
///
/// # Example
///
/// ```ignore
/// use tutor_infrastructure::SecretServiceImpl;
/// use tutor_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new()?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Cached secret config. Uses RwLock for thread-safe lazy loading.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: Arc<SecretStorage>,
    env: EnvLookup,
}

impl SecretServiceImpl {
    /// Uses the default secrets path and the process environment.
    pub fn new() -> Result<Self> {
        let storage = SecretStorage::new()
            .map_err(|e| anyhow::anyhow!("Failed to get secret path: {}", e))?;
        Ok(Self::with_storage(storage, |key| std::env::var(key).ok()))
    }

    pub fn with_storage<F>(storage: SecretStorage, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            storage: Arc::new(storage),
            env: Arc::new(env),
        }
    }

    /// Drops the cached value so the next load re-reads the file.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.secrets.write() {
            *cached = None;
        }
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        {
            let read_lock = self
                .secrets
                .read()
                .map_err(|_| "secret cache lock poisoned".to_string())?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = match self.storage.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!(
                    "No secrets file at {}, relying on environment",
                    path.display()
                );
                SecretConfig::default()
            }
            Err(e) => return Err(format!("Failed to load secrets: {}", e)),
        };
        loaded.fill_from_env(|key| (self.env)(key));
        loaded.validate().map_err(|e| e.to_string())?;

        {
            let mut write_lock = self
                .secrets
                .write()
                .map_err(|_| "secret cache lock poisoned".to_string())?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.exists()
    }
}
