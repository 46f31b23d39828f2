//! OAuth access tokens for Vertex AI.
//!
//! Tokens come either from the secrets file (`VERTEX_ACCESS_TOKEN`) or from
//! `gcloud auth application-default print-access-token`, run with the
//! service-account key passed through the child's environment only.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;
use tutor_core::config::SecretConfig;
use tutor_core::model::ModelError;
use tutor_infrastructure::MaterializedCredentials;

/// Google access tokens are valid for an hour; refresh a little early.
const TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ModelError>;
}

/// A token supplied up front. Never refreshed.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ModelError> {
        Ok(self.0.clone())
    }
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Fetches tokens from the gcloud CLI and caches them for [`TOKEN_TTL`].
pub struct GcloudTokenProvider {
    program: PathBuf,
    credentials: Option<Arc<MaterializedCredentials>>,
    cache: Mutex<Option<CachedToken>>,
}

impl GcloudTokenProvider {
    /// Uses `gcloud` from `PATH`. When `credentials` is set, the child runs
    /// with `GOOGLE_APPLICATION_CREDENTIALS` pointing at the key file.
    pub fn new(credentials: Option<Arc<MaterializedCredentials>>) -> Self {
        Self::with_program("gcloud", credentials)
    }

    pub fn with_program(
        program: impl Into<PathBuf>,
        credentials: Option<Arc<MaterializedCredentials>>,
    ) -> Self {
        Self {
            program: program.into(),
            credentials,
            cache: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<String, ModelError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["auth", "application-default", "print-access-token"]);
        if let Some(credentials) = &self.credentials {
            cmd.env("GOOGLE_APPLICATION_CREDENTIALS", credentials.path());
        }

        let output = cmd.output().await.map_err(|e| {
            ModelError::ExecutionFailed(format!(
                "Failed to run {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ModelError::ExecutionFailed(format!(
                "gcloud could not issue an access token: {}",
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(ModelError::ExecutionFailed(
                "gcloud returned an empty access token".to_string(),
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for GcloudTokenProvider {
    async fn access_token(&self) -> Result<String, ModelError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!("Refreshing Vertex AI access token");
        let token = self.fetch().await?;
        *cache = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }
}

/// Picks the token source for Vertex AI: a pre-issued token when configured,
/// otherwise gcloud.
pub fn token_provider_for(
    secrets: &SecretConfig,
    credentials: Option<Arc<MaterializedCredentials>>,
) -> Arc<dyn AccessTokenProvider> {
    match secrets.access_token() {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(GcloudTokenProvider::new(credentials)),
    }
}
