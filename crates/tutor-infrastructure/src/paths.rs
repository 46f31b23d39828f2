//! Unified path management for tutor configuration files.
//!
//! ```text
//! ~/.config/smart-tutor/       # Config directory
//! ├── config.toml              # Pipeline tunables (TutorConfig)
//! └── secrets.toml             # Cloud credentials (SecretConfig)
//!
//! ~/.local/share/smart-tutor/  # Data directory
//! └── drawings/                # Exported SVG diagrams
//! ```

use std::path::{Path, PathBuf};

use tutor_core::config::{DEFAULT_LOCATION, SecretConfig};

const APP_DIR: &str = "smart-tutor";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform paths for the tutor (XDG on Linux, the native layout elsewhere).
pub struct TutorPaths;

impl TutorPaths {
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secrets.toml"))
    }

    /// Default directory for diagrams saved from the REPL.
    pub fn drawings_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("drawings"))
    }

    /// Ensures the secrets file exists, creating a template if it doesn't.
    pub fn ensure_secret_file() -> Result<PathBuf, std::io::Error> {
        let secret_path = Self::secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        ensure_secret_file_at(&secret_path)?;
        Ok(secret_path)
    }
}

/// Writes a secrets template at `path` unless a file is already there.
///
/// On Unix the file is created with mode 600.
pub fn ensure_secret_file_at(path: &Path) -> Result<(), std::io::Error> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let template_config = SecretConfig {
        gcp_project_id: Some(String::new()),
        gcp_location: Some(DEFAULT_LOCATION.to_string()),
        ..Default::default()
    };
    let body = toml::to_string(&template_config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let template = format!(
        "# Smart Tutor secrets\n\
         # Add GOOGLE_APPLICATION_CREDENTIALS_JSON (service-account JSON) for Vertex AI,\n\
         # or GEMINI_API_KEY for the Developer API.\n\n{body}"
    );

    std::fs::write(path, template)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)?;
    }

    Ok(())
}
