//! Plain-text curriculum documents.
//!
//! Documents live under `<docs_dir>/<grade key>/<subject folder>/`, one
//! `.txt` or `.md` file per lesson or unit, searched recursively.

use std::fs;
use std::path::{Path, PathBuf};

use tutor_core::curriculum::{CurriculumIndex, Grade, Subject};
use tutor_core::error::Result;
use walkdir::WalkDir;

const EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub path: PathBuf,
    pub text: String,
}

impl CorpusDocument {
    /// Path relative to `root`, used as the chunk source label.
    pub fn source_label(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }
}

/// Folder holding one grade/subject pair's documents.
pub fn subject_dir(docs_dir: &Path, grade: Grade, subject: Subject) -> PathBuf {
    docs_dir.join(grade.as_ref()).join(subject.folder_name())
}

/// Loads every non-empty document for the pair, sorted by path.
///
/// A missing folder yields an empty list; unreadable or non-UTF-8 files are
/// skipped with a warning.
pub fn load_subject_documents(
    docs_dir: &Path,
    grade: Grade,
    subject: Subject,
) -> Vec<CorpusDocument> {
    let dir = subject_dir(docs_dir, grade, subject);
    if !dir.is_dir() {
        tracing::warn!("Curriculum folder not found: {}", dir.display());
        return Vec::new();
    }

    let mut documents: Vec<CorpusDocument> = WalkDir::new(&dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_text_extension(entry.path()))
        .filter_map(|entry| match fs::read_to_string(entry.path()) {
            Ok(text) if !text.trim().is_empty() => Some(CorpusDocument {
                path: entry.path().to_path_buf(),
                text,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                None
            }
        })
        .collect();

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(
        "Loaded {} document(s) from {}",
        documents.len(),
        dir.display()
    );
    documents
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Loads the lesson index from `path`, or the built-in one when unset.
pub fn load_curriculum_index(path: Option<&Path>) -> Result<CurriculumIndex> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            CurriculumIndex::from_json(&json)
        }
        None => Ok(CurriculumIndex::builtin()),
    }
}
