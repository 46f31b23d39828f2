//! Curriculum lesson index.
//!
//! Maps requests such as "اشرح الدرس الثالث" or "الوحدة 2" to a concrete
//! lesson of the selected grade/subject and builds a richer retrieval query
//! from the lesson's name, keywords and unit.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Grade, Subject};
use crate::error::Result;
use crate::text::{normalize, parse_digits};

/// One lesson entry in the index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One unit entry, keyed by lesson label ("الدرس 1").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    #[serde(default)]
    pub lessons: BTreeMap<String, LessonEntry>,
}

/// A subject's units, keyed by unit label ("الوحدة 1").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectIndex {
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub units: BTreeMap<String, UnitEntry>,
}

/// Resolved information about a requested lesson or unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonInfo {
    pub unit_key: String,
    pub unit_name: String,
    pub lesson_key: Option<String>,
    pub lesson_name: Option<String>,
    pub keywords: Vec<String>,
}

impl LessonInfo {
    /// One-line description for prompt enrichment. Unit requests omit the
    /// lesson part.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("الوحدة: {}", self.unit_name)];
        if let Some(lesson) = &self.lesson_name {
            parts.push(format!("الدرس: {lesson}"));
        }
        if !self.keywords.is_empty() {
            parts.push(format!("المواضيع: {}", self.keywords.join(", ")));
        }
        parts.join(" | ")
    }
}

/// A detected lesson request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonRequest {
    pub number: u32,
    pub info: LessonInfo,
    /// Retrieval query built from the lesson metadata and the question.
    pub search_query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Lesson,
    Unit,
}

/// (pattern, kind). Patterns run on normalised text, so alef variants are
/// already folded to ا.
static LESSON_PATTERNS: Lazy<Vec<(Regex, RequestKind)>> = Lazy::new(|| {
    let ordinal = "الاول|الثاني|الثالث|الرابع|الخامس|السادس|السابع|الثامن|التاسع|العاشر";
    let feminine = "الاولى|الثانية|الثالثة|الرابعة|الخامسة|السادسة";
    [
        (format!(r"الدرس\s*({ordinal})"), RequestKind::Lesson),
        (r"درس\s*(\d+)".to_string(), RequestKind::Lesson),
        (format!(r"الوحدة\s*({feminine})"), RequestKind::Unit),
        (r"وحدة\s*(\d+)".to_string(), RequestKind::Unit),
        (format!(r"الفصل\s*({ordinal})"), RequestKind::Lesson),
        (r"فصل\s*(\d+)".to_string(), RequestKind::Lesson),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(&pattern).expect("valid lesson pattern"), kind))
    .collect()
});

const STOP_WORDS: &[&str] = &[
    "في", "من", "الى", "على", "عن", "مع", "اشرح", "علمني", "اريد", "كيف", "ما", "هو", "هي",
];

/// Curriculum index keyed by grade key, then subject folder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurriculumIndex {
    grades: BTreeMap<String, BTreeMap<String, SubjectIndex>>,
}

impl CurriculumIndex {
    /// Parses an index from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The built-in index used when no index file is configured.
    pub fn builtin() -> Self {
        let mut lessons = BTreeMap::new();
        lessons.insert(
            "الدرس 1".to_string(),
            LessonEntry {
                name: "حرف الألف".to_string(),
                keywords: vec!["أبجدية".into(), "حرف".into(), "كتابة".into()],
            },
        );
        lessons.insert(
            "الدرس 2".to_string(),
            LessonEntry {
                name: "حرف الباء".to_string(),
                keywords: vec!["أبجدية".into(), "حرف".into(), "كتابة".into()],
            },
        );

        let mut units = BTreeMap::new();
        units.insert(
            "الوحدة 1".to_string(),
            UnitEntry {
                name: "أسرتي".to_string(),
                lessons,
            },
        );

        let mut subjects = BTreeMap::new();
        subjects.insert(
            Subject::Arabic.folder_name().to_string(),
            SubjectIndex {
                subject_name: Subject::Arabic.title().to_string(),
                units,
            },
        );

        let mut grades = BTreeMap::new();
        grades.insert(Grade::Grade1.to_string(), subjects);
        Self { grades }
    }

    /// Detects a specific lesson or unit request in the question.
    ///
    /// Returns `None` when no pattern matches or the index has no matching
    /// entry for the selection.
    pub fn detect_lesson_request(
        &self,
        question: &str,
        grade: Grade,
        subject: Subject,
    ) -> Option<LessonRequest> {
        let normalized = normalize(question);
        for (pattern, kind) in LESSON_PATTERNS.iter() {
            let Some(captures) = pattern.captures(&normalized) else {
                continue;
            };
            let Some(number) = captures.get(1).and_then(|m| identifier_to_number(m.as_str()))
            else {
                continue;
            };
            let info = match kind {
                RequestKind::Lesson => self.lesson_info(grade, subject, number),
                RequestKind::Unit => self.unit_info(grade, subject, number),
            };
            if let Some(info) = info {
                let search_query = build_search_query(&info, question);
                return Some(LessonRequest {
                    number,
                    info,
                    search_query,
                });
            }
        }
        None
    }

    /// One-line context describing a lesson, for prompt enrichment.
    pub fn lesson_context(&self, grade: Grade, subject: Subject, number: u32) -> String {
        self.lesson_info(grade, subject, number)
            .map(|info| info.describe())
            .unwrap_or_default()
    }

    fn subject_index(&self, grade: Grade, subject: Subject) -> Option<&SubjectIndex> {
        self.grades
            .get(grade.as_ref())
            .and_then(|subjects| subjects.get(subject.folder_name()))
    }

    fn lesson_info(&self, grade: Grade, subject: Subject, number: u32) -> Option<LessonInfo> {
        let index = self.subject_index(grade, subject)?;
        index.units.iter().find_map(|(unit_key, unit)| {
            unit.lessons
                .iter()
                .find(|(lesson_key, _)| label_number(lesson_key) == Some(number))
                .map(|(lesson_key, lesson)| LessonInfo {
                    unit_key: unit_key.clone(),
                    unit_name: unit.name.clone(),
                    lesson_key: Some(lesson_key.clone()),
                    lesson_name: Some(lesson.name.clone()),
                    keywords: lesson.keywords.clone(),
                })
        })
    }

    fn unit_info(&self, grade: Grade, subject: Subject, number: u32) -> Option<LessonInfo> {
        let index = self.subject_index(grade, subject)?;
        index
            .units
            .iter()
            .find(|(unit_key, _)| label_number(unit_key) == Some(number))
            .map(|(unit_key, unit)| {
                let mut keywords: Vec<String> = Vec::new();
                for lesson in unit.lessons.values() {
                    for keyword in &lesson.keywords {
                        if !keywords.contains(keyword) {
                            keywords.push(keyword.clone());
                        }
                    }
                }
                LessonInfo {
                    unit_key: unit_key.clone(),
                    unit_name: unit.name.clone(),
                    lesson_key: None,
                    lesson_name: None,
                    keywords,
                }
            })
    }
}

fn identifier_to_number(identifier: &str) -> Option<u32> {
    let number = match identifier {
        "الاول" | "الاولى" => 1,
        "الثاني" | "الثانية" => 2,
        "الثالث" | "الثالثة" => 3,
        "الرابع" | "الرابعة" => 4,
        "الخامس" | "الخامسة" => 5,
        "السادس" | "السادسة" => 6,
        "السابع" => 7,
        "الثامن" => 8,
        "التاسع" => 9,
        "العاشر" => 10,
        other => return parse_digits(other),
    };
    Some(number)
}

/// Trailing number of a label such as "الدرس 12".
fn label_number(label: &str) -> Option<u32> {
    label.split_whitespace().last().and_then(parse_digits)
}

fn build_search_query(info: &LessonInfo, question: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = &info.lesson_name {
        parts.push(name.clone());
    }
    parts.extend(info.keywords.iter().take(3).cloned());
    if !info.unit_name.is_empty() {
        parts.push(info.unit_name.clone());
    }
    parts.extend(relevant_words(question));
    parts.join(" ")
}

/// Up to three content words of the question, stop words removed.
fn relevant_words(question: &str) -> Vec<String> {
    normalize(question)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || ('\u{0600}'..='\u{06FF}').contains(c))
                .collect::<String>()
        })
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(&word.as_str()))
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_ordinal_lesson_request() {
        let index = CurriculumIndex::builtin();
        let request = index
            .detect_lesson_request("اشرح لي الدرس الأول", Grade::Grade1, Subject::Arabic)
            .expect("lesson should be detected");

        assert_eq!(request.number, 1);
        assert_eq!(request.info.lesson_name.as_deref(), Some("حرف الألف"));
        assert_eq!(request.info.unit_name, "أسرتي");
        assert!(request.search_query.starts_with("حرف الألف"));
        assert!(request.search_query.contains("أسرتي"));
        assert!(request.search_query.contains("الدرس"));
    }

    #[test]
    fn test_detects_arabic_indic_digit() {
        let index = CurriculumIndex::builtin();
        let request = index
            .detect_lesson_request("درس ٢", Grade::Grade1, Subject::Arabic)
            .expect("lesson should be detected");
        assert_eq!(request.info.lesson_name.as_deref(), Some("حرف الباء"));
    }

    #[test]
    fn test_unit_request_merges_keywords() {
        let index = CurriculumIndex::builtin();
        let request = index
            .detect_lesson_request("ماذا في الوحدة الأولى؟", Grade::Grade1, Subject::Arabic)
            .expect("unit should be detected");
        assert!(request.info.lesson_name.is_none());
        assert_eq!(request.info.keywords.len(), 3);
    }

    #[test]
    fn test_no_request_for_other_selection_or_plain_question() {
        let index = CurriculumIndex::builtin();
        assert!(index
            .detect_lesson_request("الدرس الأول", Grade::Grade2, Subject::Arabic)
            .is_none());
        assert!(index
            .detect_lesson_request("ما هو الجمع؟", Grade::Grade1, Subject::Arabic)
            .is_none());
        // Lesson 10 must not match lesson 1.
        assert!(index
            .detect_lesson_request("الدرس العاشر", Grade::Grade1, Subject::Arabic)
            .is_none());
    }

    #[test]
    fn test_from_json_and_lesson_context() {
        let json = r#"{
            "grade_2": {
                "Math": {
                    "subject_name": "الرياضيات",
                    "units": {
                        "الوحدة 1": {
                            "name": "الجمع",
                            "lessons": {
                                "الدرس 3": {"name": "الجمع بإعادة التجميع", "keywords": ["جمع", "آحاد", "عشرات"]}
                            }
                        }
                    }
                }
            }
        }"#;
        let index = CurriculumIndex::from_json(json).unwrap();
        assert_eq!(
            index.lesson_context(Grade::Grade2, Subject::Math, 3),
            "الوحدة: الجمع | الدرس: الجمع بإعادة التجميع | المواضيع: جمع, آحاد, عشرات"
        );
        assert_eq!(index.lesson_context(Grade::Grade2, Subject::Math, 4), "");
    }
}
