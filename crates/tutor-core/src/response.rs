//! Structured model output and the permissive JSON cleanup applied to raw
//! model text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid json object regex"));
static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma regex"));

/// Explanation shown when no attempt produced a parseable explanation.
pub const FALLBACK_EXPLANATION: &str = "عذراً، لم أتمكن من إنشاء شرح مناسب.";

/// Scores of the two quality checks, each 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScores {
    pub explanation: u8,
    pub svg: u8,
}

/// The accepted result of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text_explanation: String,
    pub svg_code: Option<String>,
    pub quality_scores: QualityScores,
    /// Empty when the response passed both quality checks.
    pub quality_issues: Vec<String>,
    /// Number of model calls made to produce this response.
    #[serde(default)]
    pub attempts: u32,
}

impl ModelResponse {
    /// A response carrying only an explanation and an issue, used when the
    /// model could not be reached at all.
    pub fn unavailable(explanation: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            text_explanation: explanation.into(),
            svg_code: None,
            quality_scores: QualityScores::default(),
            quality_issues: vec![issue.into()],
            attempts: 0,
        }
    }

    pub fn passed_quality(&self) -> bool {
        self.quality_issues.is_empty()
    }
}

/// The two fields the model is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelPayload {
    pub text_explanation: Option<String>,
    pub svg_code: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("رد فارغ من النموذج")]
    Empty,
    #[error("لم يتمكن من استخلاص JSON")]
    NoJsonObject,
    #[error("فشل في تحليل JSON: {0}")]
    InvalidJson(String),
}

/// Extracts the outermost `{...}` span from raw model text, with surrounding
/// markdown code fences removed.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = strip_code_fences(raw.trim());
    JSON_OBJECT.find(trimmed).map(|m| m.as_str().trim())
}

fn strip_code_fences(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parses raw model text into a [`ModelPayload`].
///
/// Tolerates code fences, leading/trailing prose and trailing commas.
/// `svg_code` values of `null`, `"null"` or blank are read as absent.
pub fn parse_model_payload(raw: &str) -> Result<ModelPayload, PayloadError> {
    if raw.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    let json = extract_json_object(raw).ok_or(PayloadError::NoJsonObject)?;

    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(first) => {
            let repaired = TRAILING_COMMA.replace_all(json, "$1");
            serde_json::from_str(&repaired)
                .map_err(|_| PayloadError::InvalidJson(first.to_string()))?
        }
    };

    let Value::Object(map) = value else {
        return Err(PayloadError::InvalidJson("expected a JSON object".to_string()));
    };

    Ok(ModelPayload {
        text_explanation: map
            .get("text_explanation")
            .and_then(Value::as_str)
            .map(str::to_string),
        svg_code: map
            .get("svg_code")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|svg| !svg.is_empty() && !svg.eq_ignore_ascii_case("null"))
            .map(str::to_string),
    })
}
