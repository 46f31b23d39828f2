//! Secret management service trait.

use crate::config::SecretConfig;

/// Service for loading cloud credentials.
///
/// Implementations must never log secret values or include them in error
/// messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// The error string must not contain secret values.
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Checks if the secrets file exists.
    async fn secret_file_exists(&self) -> bool;
}
