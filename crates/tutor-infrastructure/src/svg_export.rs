//! Saving generated diagrams to disk.

use std::fs;
use std::path::{Path, PathBuf};

/// Files at or below this size are treated as a failed write.
const MIN_SVG_BYTES: u64 = 50;

#[derive(Debug)]
pub enum SvgExportError {
    EmptyContent,
    IoError(std::io::Error),
    /// The written file was suspiciously small.
    Truncated { path: PathBuf, bytes: u64 },
}

impl std::fmt::Display for SvgExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SvgExportError::EmptyContent => write!(f, "SVG content is empty"),
            SvgExportError::IoError(e) => write!(f, "I/O error: {}", e),
            SvgExportError::Truncated { path, bytes } => write!(
                f,
                "SVG file {} is only {} bytes",
                path.display(),
                bytes
            ),
        }
    }
}

impl std::error::Error for SvgExportError {}

impl From<std::io::Error> for SvgExportError {
    fn from(e: std::io::Error) -> Self {
        SvgExportError::IoError(e)
    }
}

/// Writes `content` to `path`, creating parent directories.
pub fn save_svg(content: &str, path: &Path) -> Result<PathBuf, SvgExportError> {
    if content.trim().is_empty() {
        return Err(SvgExportError::EmptyContent);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content.as_bytes())?;

    let bytes = fs::metadata(path)?.len();
    if bytes <= MIN_SVG_BYTES {
        return Err(SvgExportError::Truncated {
            path: path.to_path_buf(),
            bytes,
        });
    }

    tracing::info!("Saved SVG ({} bytes) to {}", bytes, path.display());
    Ok(path.to_path_buf())
}
