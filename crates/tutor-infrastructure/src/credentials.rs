//! Service-account credential materialisation.
//!
//! Google tooling reads service-account keys from a file named by
//! `GOOGLE_APPLICATION_CREDENTIALS`. The key arrives inline in the secrets
//! file, so it is written to a private temporary file that lives as long as
//! the returned handle. The path is handed to child processes explicitly;
//! the parent's environment is never modified.

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tutor_core::TutorError;
use tutor_core::config::CredentialsBlob;
use tutor_core::error::Result;

const REQUIRED_KEYS: &[&str] = &["type", "project_id", "private_key", "client_email"];

/// A service-account key written to a temporary file.
///
/// The file is deleted when this value is dropped.
pub struct MaterializedCredentials {
    file: NamedTempFile,
    project_id: String,
    client_email: String,
}

impl MaterializedCredentials {
    /// Validates the key and writes it to a fresh temporary file.
    pub fn materialize(blob: &CredentialsBlob) -> Result<Self> {
        let object = blob.to_json_object()?;
        validate_service_account(&object)?;

        let project_id = string_field(&object, "project_id");
        let client_email = string_field(&object, "client_email");

        let mut file = tempfile::Builder::new()
            .prefix("tutor-credentials-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut file, &Value::Object(object))?;
        file.flush()?;

        tracing::info!("Service account credentials ready for {}", client_email);
        Ok(Self {
            file,
            project_id,
            client_email,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

impl fmt::Debug for MaterializedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializedCredentials")
            .field("path", &self.file.path())
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish()
    }
}

/// Checks that every key Google's auth libraries require is a non-empty string.
pub fn validate_service_account(object: &Map<String, Value>) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .is_none_or(|v| v.trim().is_empty())
        })
        .collect();

    if !missing.is_empty() {
        return Err(TutorError::config(format!(
            "service account credentials are missing: {}",
            missing.join(", ")
        )));
    }
    if object.get("type").and_then(Value::as_str) != Some("service_account") {
        return Err(TutorError::config(
            "credentials type must be 'service_account'",
        ));
    }
    Ok(())
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
