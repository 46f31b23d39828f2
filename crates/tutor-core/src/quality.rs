//! Heuristic quality checks for model output.
//!
//! Each check starts at 100 and subtracts a fixed penalty per defect. Scores
//! clamp at 0.

use serde::Serialize;

use crate::text::{contains_arabic, word_count};

pub const EXPLANATION_PASS_SCORE: u8 = 60;
pub const SVG_PASS_SCORE: u8 = 50;

const MIN_EXPLANATION_CHARS: usize = 15;
const MIN_EXPLANATION_WORDS: usize = 5;
const MAX_EXPLANATION_WORDS: usize = 250;
const MIN_SVG_CHARS: usize = 50;
const DRAWABLE_ELEMENTS: &[&str] = &[
    "<rect", "<circle", "<line", "<text", "<path", "<polygon", "<g",
];

/// Result of one quality check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub score: u8,
    pub issues: Vec<String>,
    pub is_valid: bool,
}

impl QualityReport {
    fn perfect() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
            is_valid: true,
        }
    }
}

struct Tally {
    score: i32,
    issues: Vec<String>,
}

impl Tally {
    fn new() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
        }
    }

    fn penalize(&mut self, penalty: i32, issue: &str) {
        self.score -= penalty;
        self.issues.push(issue.to_string());
    }

    fn finish(self, pass: u8) -> QualityReport {
        let score = self.score.clamp(0, 100) as u8;
        QualityReport {
            score,
            issues: self.issues,
            is_valid: score >= pass,
        }
    }
}

/// Scores an explanation.
///
/// The Arabic-script penalty only applies when `expects_arabic` is set.
pub fn check_explanation(explanation: Option<&str>, expects_arabic: bool) -> QualityReport {
    let mut tally = Tally::new();
    let text = explanation.unwrap_or_default();
    let present = !text.is_empty();

    if text.trim().chars().count() < MIN_EXPLANATION_CHARS {
        tally.penalize(50, "الشرح قصير جداً أو فارغ.");
    }
    if present && expects_arabic && !contains_arabic(text) {
        tally.penalize(30, "الشرح لا يبدو أنه باللغة العربية.");
    }
    let words = word_count(text);
    if present && words < MIN_EXPLANATION_WORDS {
        tally.penalize(20, "الشرح قصير جداً.");
    } else if present && words > MAX_EXPLANATION_WORDS {
        tally.penalize(15, "الشرح طويل جداً للمرحلة الابتدائية.");
    }

    tally.finish(EXPLANATION_PASS_SCORE)
}

/// Scores SVG markup. A missing drawing fails every structural check.
pub fn check_svg(svg: Option<&str>) -> QualityReport {
    let mut tally = Tally::new();
    let markup = svg.unwrap_or_default();

    if markup.trim().chars().count() < MIN_SVG_CHARS {
        tally.penalize(60, "كود SVG قصير جداً أو فارغ.");
    }
    if !markup.contains("<svg") {
        tally.penalize(30, "لا يحتوي على وسم <svg> الافتتاحي.");
    }
    if !markup.contains("</svg>") {
        tally.penalize(25, "وسم </svg> الختامي غير موجود.");
    }
    if !markup.contains("width=") || !markup.contains("height=") {
        tally.penalize(15, "لا يحتوي على أبعاد واضحة.");
    }
    if !DRAWABLE_ELEMENTS.iter().any(|element| markup.contains(element)) {
        tally.penalize(40, "لا يحتوي على عناصر رسم فعلية.");
    }

    tally.finish(SVG_PASS_SCORE)
}

/// Scores SVG markup only when a drawing was asked for.
pub fn check_svg_if_required(svg: Option<&str>, drawing_required: bool) -> QualityReport {
    if drawing_required {
        check_svg(svg)
    } else {
        QualityReport::perfect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_EXPLANATION: &str =
        "مرحباً يا بطل! الجمع يعني أن نضع الأشياء معاً. عندك تفاحتان وأضفنا ثلاث تفاحات فصار المجموع خمس تفاحات.";
    const GOOD_SVG: &str = r##"<svg width="700" height="500" xmlns="http://www.w3.org/2000/svg"><rect width="700" height="500" fill="white"/><circle cx="100" cy="100" r="40" fill="#FF6B6B"/></svg>"##;

    #[test]
    fn test_good_explanation_is_perfect() {
        let report = check_explanation(Some(GOOD_EXPLANATION), true);
        assert_eq!(report.score, 100);
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_explanation() {
        let report = check_explanation(None, true);
        assert_eq!(report.score, 50);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_english_explanation_penalized_only_when_arabic_expected() {
        let text = "Addition means putting two groups of things together to count them.";
        assert_eq!(check_explanation(Some(text), true).score, 70);
        assert_eq!(check_explanation(Some(text), false).score, 100);
    }

    #[test]
    fn test_long_explanation_penalized() {
        let text = "كلمة ".repeat(260);
        let report = check_explanation(Some(&text), true);
        assert_eq!(report.score, 85);
        assert!(report.is_valid);
    }

    #[test]
    fn test_short_garbage_clamps_to_zero_floor() {
        let report = check_explanation(Some("ok"), true);
        assert_eq!(report.score, 0);
        assert_eq!(report.issues.len(), 3);
    }

    #[test]
    fn test_good_svg_is_perfect() {
        let report = check_svg(Some(GOOD_SVG));
        assert_eq!(report.score, 100);
        assert!(report.is_valid);
    }

    #[test]
    fn test_missing_svg_scores_zero() {
        let report = check_svg(None);
        assert_eq!(report.score, 0);
        assert_eq!(report.issues.len(), 5);
    }

    #[test]
    fn test_svg_without_close_tag_or_dimensions() {
        let svg = GOOD_SVG.replace("</svg>", "");
        assert_eq!(check_svg(Some(&svg)).score, 75);

        let svg = GOOD_SVG.replace("width=\"700\" height=\"500\" ", "").replace(
            "<rect width=\"700\" height=\"500\" fill=\"white\"/>",
            "<rect fill=\"white\"/>",
        );
        assert_eq!(check_svg(Some(&svg)).score, 85);
    }

    #[test]
    fn test_svg_skipped_when_not_required() {
        let report = check_svg_if_required(None, false);
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());

        assert!(!check_svg_if_required(None, true).is_valid);
    }
}
