use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tutor_core::model::{GenerationParams, LanguageModel, ModelError};
use tutor_core::response::FALLBACK_EXPLANATION;
use tutor_interaction::{GateRequest, QualityGatedClient};

const GOOD_EXPLANATION: &str = "الجمع يعني أن نضع الأشياء معاً. عندك تفاحتان وأضفنا ثلاث تفاحات فصار المجموع خمس تفاحات.";
const GOOD_SVG: &str = r##"<svg width="700" height="500" xmlns="http://www.w3.org/2000/svg"><circle cx="100" cy="100" r="40" fill="#FF6B6B"/><text x="50" y="200">2 + 3 = 5</text></svg>"##;

/// Replays canned replies and records every call.
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), params.temperature));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("not json at all".to_string()))
    }
}

fn payload(explanation: &str, svg: Option<&str>) -> Result<String, ModelError> {
    Ok(serde_json::json!({ "text_explanation": explanation, "svg_code": svg }).to_string())
}

const DRAWING: GateRequest = GateRequest {
    expects_arabic: true,
    drawing_required: true,
};

#[tokio::test]
async fn invalid_json_then_valid_takes_two_attempts() {
    let model = ScriptedModel::new(vec![
        Ok("{\"text_explanation\": \"الجمع\" \"svg_code\": null}".to_string()),
        payload(GOOD_EXPLANATION, Some(GOOD_SVG)),
    ]);
    let client = QualityGatedClient::new(model.clone(), 2);

    let response = client.generate("اشرح لي جمع 2+3", DRAWING).await;

    assert_eq!(response.attempts, 2);
    assert!(response.quality_issues.is_empty());
    assert_eq!(response.text_explanation, GOOD_EXPLANATION);
    assert_eq!(response.svg_code.as_deref(), Some(GOOD_SVG));
    assert_eq!(response.quality_scores.explanation, 100);
    assert_eq!(response.quality_scores.svg, 100);

    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "اشرح لي جمع 2+3");
    assert_eq!(calls[0].1, 0.65);
    assert!(calls[1].0.starts_with("اشرح لي جمع 2+3\n\n--- ملاحظات للتحسين ---"));
    assert!(calls[1].0.contains("فشل في تحليل JSON"));
    assert_eq!(calls[1].1, 0.5);
}

#[tokio::test]
async fn attempts_never_exceed_bound() {
    for max_retries in 0..4 {
        let model = ScriptedModel::new(Vec::new());
        let client = QualityGatedClient::new(model.clone(), max_retries);

        let response = client.generate("سؤال", DRAWING).await;

        assert_eq!(model.calls().len() as u32, 1 + max_retries);
        assert_eq!(response.attempts, 1 + max_retries);
        assert_eq!(response.text_explanation, FALLBACK_EXPLANATION);
        // The same parse failure every time is reported once.
        assert_eq!(response.quality_issues, vec!["لم يتمكن من استخلاص JSON".to_string()]);
    }
}

#[tokio::test]
async fn exhausted_keeps_last_parsed_response_and_all_issues() {
    let model = ScriptedModel::new(vec![
        payload("قصير", Some(GOOD_SVG)),
        Err(ModelError::ProcessError {
            status_code: Some(503),
            message: "UNAVAILABLE: overloaded".into(),
            is_retryable: true,
            retry_after: None,
        }),
        payload(GOOD_EXPLANATION, None),
    ]);
    let client = QualityGatedClient::new(model.clone(), 2);

    let response = client.generate("ارسم مثلثاً", DRAWING).await;

    assert_eq!(model.calls().len(), 3);
    assert_eq!(response.attempts, 3);
    assert_eq!(response.text_explanation, GOOD_EXPLANATION);
    assert!(response.svg_code.is_none());
    assert!(response.quality_scores.svg < 50);
    assert!(response.quality_issues.iter().any(|i| i.starts_with("شرح: ")));
    assert!(response.quality_issues.iter().any(|i| i.contains("خطأ في الاتصال بالنموذج")));
    assert!(response.quality_issues.iter().any(|i| i.starts_with("رسم: ")));
    assert!(!response.passed_quality());
}

#[tokio::test]
async fn missing_svg_is_fine_when_no_drawing_required() {
    let model = ScriptedModel::new(vec![payload(GOOD_EXPLANATION, None)]);
    let client = QualityGatedClient::new(model.clone(), 2);

    let response = client
        .generate(
            "ما معنى الصدق؟",
            GateRequest {
                expects_arabic: true,
                drawing_required: false,
            },
        )
        .await;

    assert_eq!(model.calls().len(), 1);
    assert!(response.passed_quality());
    assert_eq!(response.quality_scores.svg, 100);
}

#[tokio::test]
async fn english_explanations_skip_arabic_check() {
    let model = ScriptedModel::new(vec![payload(
        "A noun is the name of a person, place, animal or thing.",
        None,
    )]);
    let client = QualityGatedClient::new(model, 1);

    let response = client
        .generate(
            "what is a noun",
            GateRequest {
                expects_arabic: false,
                drawing_required: false,
            },
        )
        .await;

    assert!(response.passed_quality());
    assert_eq!(response.attempts, 1);
}
