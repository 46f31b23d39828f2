//! Curriculum scoping keys.
//!
//! A `(Grade, Subject)` pair selects both the prompt style profile and the
//! vector-store collection holding that pair's curriculum text.

mod lesson_index;

pub use lesson_index::{CurriculumIndex, LessonInfo, LessonRequest};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, TutorError};

/// Primary-school grade, keyed as `grade_1` .. `grade_6`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Grade {
    #[strum(serialize = "grade_1")]
    #[serde(rename = "grade_1")]
    Grade1,
    #[strum(serialize = "grade_2")]
    #[serde(rename = "grade_2")]
    Grade2,
    #[strum(serialize = "grade_3")]
    #[serde(rename = "grade_3")]
    Grade3,
    #[strum(serialize = "grade_4")]
    #[serde(rename = "grade_4")]
    Grade4,
    #[strum(serialize = "grade_5")]
    #[serde(rename = "grade_5")]
    Grade5,
    #[strum(serialize = "grade_6")]
    #[serde(rename = "grade_6")]
    Grade6,
}

impl Grade {
    /// Arabic display name, e.g. "الصف الأول الابتدائي".
    pub fn display_name(&self) -> &'static str {
        match self {
            Grade::Grade1 => "الصف الأول الابتدائي",
            Grade::Grade2 => "الصف الثاني الابتدائي",
            Grade::Grade3 => "الصف الثالث الابتدائي",
            Grade::Grade4 => "الصف الرابع الابتدائي",
            Grade::Grade5 => "الصف الخامس الابتدائي",
            Grade::Grade6 => "الصف السادس الابتدائي",
        }
    }

    /// Numeric grade (1-6).
    pub fn number(&self) -> u8 {
        match self {
            Grade::Grade1 => 1,
            Grade::Grade2 => 2,
            Grade::Grade3 => 3,
            Grade::Grade4 => 4,
            Grade::Grade5 => 5,
            Grade::Grade6 => 6,
        }
    }

    /// Parses a grade key such as `grade_3`.
    pub fn parse_key(key: &str) -> Result<Self> {
        key.trim()
            .parse()
            .map_err(|_| TutorError::invalid_input(format!("unknown grade key '{key}'")))
    }

    pub fn all() -> impl Iterator<Item = Grade> {
        Grade::iter()
    }
}

impl Default for Grade {
    fn default() -> Self {
        Grade::Grade1
    }
}

/// School subject as used by the app (`arabic`, `math`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Subject {
    Arabic,
    Math,
    Science,
    Islamic,
    English,
    Social,
}

impl Subject {
    /// Subject name used inside prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Subject::Arabic => "اللغة العربية",
            Subject::Math => "الرياضيات",
            Subject::Science => "العلوم",
            Subject::Islamic => "التربية الإسلامية",
            Subject::English => "اللغة الإنجليزية",
            Subject::Social => "المهارات الحياتية",
        }
    }

    /// Student-facing course title shown in the subject selector.
    pub fn title(&self) -> &'static str {
        match self {
            Subject::Arabic => "لغتي الجميلة",
            Subject::Math => "الرياضيات",
            Subject::Science => "العلوم",
            Subject::Islamic => "التربية الإسلامية",
            Subject::English => "اللغة الإنجليزية",
            Subject::Social => "المهارات الحياتية والأسرية",
        }
    }

    /// Folder holding this subject's curriculum documents.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Subject::Arabic => "lughati",
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::Islamic => "الدراسات الاسلامية",
            Subject::English => "English",
            Subject::Social => "المهارات الأسرية",
        }
    }

    /// Whether explanations for this subject are expected in Arabic script.
    pub fn expects_arabic(&self) -> bool {
        !matches!(self, Subject::English)
    }

    /// Parses a subject key such as `math`.
    pub fn parse_key(key: &str) -> Result<Self> {
        key.trim()
            .parse()
            .map_err(|_| TutorError::invalid_input(format!("unknown subject key '{key}'")))
    }

    pub fn all() -> impl Iterator<Item = Subject> {
        Subject::iter()
    }
}

impl Default for Subject {
    fn default() -> Self {
        Subject::Arabic
    }
}

/// Deterministic vector-store collection name for a grade/subject pair.
///
/// Arabic folder names are mapped to ASCII so the name stays a valid Chroma
/// collection identifier.
pub fn collection_name(grade: Grade, subject: Subject) -> String {
    collection_name_for_folders(grade.as_ref(), subject.folder_name())
}

/// Same as [`collection_name`] but from raw folder names.
pub fn collection_name_for_folders(grade_folder: &str, subject_folder: &str) -> String {
    let grade = grade_folder.replace(' ', "_").to_lowercase();
    let subject = subject_folder
        .replace(' ', "_")
        .to_lowercase()
        .replace("الدراسات_الاسلامية", "islamic_studies")
        .replace("المهارات_الأسرية", "family_skills");
    format!("{grade}_{subject}_coll")
}
