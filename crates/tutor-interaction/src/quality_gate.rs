//! Quality-gated generation.
//!
//! Each question runs a bounded state machine:
//!
//! ```text
//! Attempt ──▶ Validate ──▶ Accept
//!    ▲            │
//!    └── Retry ◀──┤
//!                 └──▶ Exhausted
//! ```
//!
//! Transport and parse failures are validation failures like any other. After
//! `1 + max_retries` attempts the last parsed response is returned with every
//! issue seen along the way.

use std::sync::Arc;
use std::time::Duration;

use tutor_core::model::{GenerationParams, LanguageModel, ModelError};
use tutor_core::quality::{check_explanation, check_svg_if_required};
use tutor_core::response::{
    FALLBACK_EXPLANATION, ModelResponse, QualityScores, parse_model_payload,
};

/// Longest server-requested back-off honoured between attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// What a single generation needs to know about the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRequest {
    pub expects_arabic: bool,
    pub drawing_required: bool,
}

enum GateState {
    Attempt { attempt: u32, prompt: String },
    Validate { attempt: u32, outcome: AttemptOutcome },
    Retry { attempt: u32, issues: Vec<String>, delay: Option<Duration> },
    Accept(ModelResponse),
    Exhausted { attempts: u32 },
}

/// Issues found in one attempt, plus any server-requested back-off.
type Rejection = (Vec<String>, Option<Duration>);

enum AttemptOutcome {
    Text(String),
    Failed { message: String, retry_after: Option<Duration> },
}

/// Wraps a [`LanguageModel`] with parsing, quality checks and corrective
/// retries.
#[derive(Clone)]
pub struct QualityGatedClient {
    model: Arc<dyn LanguageModel>,
    max_retries: u32,
}

impl QualityGatedClient {
    pub fn new(model: Arc<dyn LanguageModel>, max_retries: u32) -> Self {
        Self { model, max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Runs the state machine for `prompt`. Never fails: the worst case is
    /// the fallback explanation with the collected issues.
    pub async fn generate(&self, prompt: &str, request: GateRequest) -> ModelResponse {
        let max_attempts = 1 + self.max_retries;
        let mut issues: Vec<String> = Vec::new();
        let mut last_parsed: Option<ModelResponse> = None;
        let mut state = GateState::Attempt {
            attempt: 0,
            prompt: prompt.to_string(),
        };

        loop {
            state = match state {
                GateState::Attempt { attempt, prompt } => {
                    tracing::debug!(
                        "Model attempt {}/{} with {}",
                        attempt + 1,
                        max_attempts,
                        self.model.name()
                    );
                    let params = GenerationParams::for_attempt(attempt);
                    let outcome = match self.model.generate(&prompt, &params).await {
                        Ok(text) => AttemptOutcome::Text(text),
                        Err(e) => {
                            let retry_after = match &e {
                                ModelError::ProcessError { retry_after, .. } => *retry_after,
                                _ => None,
                            };
                            AttemptOutcome::Failed {
                                message: e.to_string(),
                                retry_after,
                            }
                        }
                    };
                    GateState::Validate { attempt, outcome }
                }

                GateState::Validate { attempt, outcome } => {
                    let verdict: Result<ModelResponse, Rejection> = match outcome {
                        AttemptOutcome::Failed {
                            message,
                            retry_after,
                        } => {
                            tracing::warn!("Model call failed on attempt {}: {}", attempt + 1, message);
                            Err((vec![format!("خطأ في الاتصال بالنموذج: {message}")], retry_after))
                        }
                        AttemptOutcome::Text(raw) => match parse_model_payload(&raw) {
                            Err(e) => {
                                tracing::warn!("Unparseable response on attempt {}: {}", attempt + 1, e);
                                Err((vec![e.to_string()], None))
                            }
                            Ok(payload) => {
                                let explanation = check_explanation(
                                    payload.text_explanation.as_deref(),
                                    request.expects_arabic,
                                );
                                let svg = check_svg_if_required(
                                    payload.svg_code.as_deref(),
                                    request.drawing_required,
                                );
                                let mut found: Vec<String> = explanation
                                    .issues
                                    .iter()
                                    .map(|i| format!("شرح: {i}"))
                                    .collect();
                                found.extend(svg.issues.iter().map(|i| format!("رسم: {i}")));

                                let response = ModelResponse {
                                    text_explanation: payload
                                        .text_explanation
                                        .filter(|t| !t.trim().is_empty())
                                        .unwrap_or_else(|| FALLBACK_EXPLANATION.to_string()),
                                    svg_code: payload.svg_code,
                                    quality_scores: QualityScores {
                                        explanation: explanation.score,
                                        svg: svg.score,
                                    },
                                    quality_issues: Vec::new(),
                                    attempts: attempt + 1,
                                };

                                if explanation.is_valid && svg.is_valid {
                                    tracing::info!(
                                        "Response accepted on attempt {} (explanation {}, svg {})",
                                        attempt + 1,
                                        explanation.score,
                                        svg.score
                                    );
                                    Ok(response)
                                } else {
                                    tracing::info!(
                                        "Response below threshold on attempt {} (explanation {}, svg {})",
                                        attempt + 1,
                                        explanation.score,
                                        svg.score
                                    );
                                    last_parsed = Some(response);
                                    Err((found, None))
                                }
                            }
                        },
                    };

                    match verdict {
                        Ok(response) => GateState::Accept(response),
                        Err((attempt_issues, delay)) => {
                            for issue in &attempt_issues {
                                if !issues.contains(issue) {
                                    issues.push(issue.clone());
                                }
                            }
                            if attempt + 1 < max_attempts {
                                GateState::Retry {
                                    attempt,
                                    issues: attempt_issues,
                                    delay,
                                }
                            } else {
                                GateState::Exhausted {
                                    attempts: attempt + 1,
                                }
                            }
                        }
                    }
                }

                GateState::Retry {
                    attempt,
                    issues: attempt_issues,
                    delay,
                } => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay.min(MAX_RETRY_DELAY)).await;
                    }
                    let prompt = format!(
                        "{prompt}{}",
                        corrective_suffix(&attempt_issues, request.drawing_required)
                    );
                    GateState::Attempt {
                        attempt: attempt + 1,
                        prompt,
                    }
                }

                GateState::Accept(response) => return response,

                GateState::Exhausted { attempts } => {
                    tracing::warn!(
                        "Quality gate exhausted after {} attempt(s) with {} issue(s)",
                        attempts,
                        issues.len()
                    );
                    let mut response = last_parsed.take().unwrap_or_else(|| ModelResponse {
                        text_explanation: FALLBACK_EXPLANATION.to_string(),
                        svg_code: None,
                        quality_scores: QualityScores::default(),
                        quality_issues: Vec::new(),
                        attempts,
                    });
                    response.attempts = attempts;
                    response.quality_issues = std::mem::take(&mut issues);
                    return response;
                }
            };
        }
    }
}

/// Feedback appended to the original prompt before a retry.
pub fn corrective_suffix(issues: &[String], drawing_required: bool) -> String {
    let drawing_line = if drawing_required {
        "3. رسم SVG كامل وصالح"
    } else {
        "3. وضع القيمة null في svg_code"
    };
    format!(
        "\n\n--- ملاحظات للتحسين ---\n\
         ⚠️ المحاولة السابقة كان بها: {}\n\
         يرجى التركيز على:\n\
         1. إنتاج JSON صالح بالبنية المطلوبة\n\
         2. شرح واضح باللغة العربية المبسطة\n\
         {}\n\
         --- نهاية الملاحظات ---\n",
        issues.join(" و "),
        drawing_line
    )
}
