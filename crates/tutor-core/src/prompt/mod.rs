//! Prompt composition.
//!
//! Builds the single instruction string sent to the model: the JSON output
//! contract, the grade's reading level, subject guidance, the drawing
//! decision, and optional retrieved context and conversation summary.

mod profiles;
mod templates;

pub use profiles::{GradeProfile, SVG_CANVAS, SvgCanvas, grade_profile, subject_guidance};

use minijinja::{Environment, context};
use serde::Serialize;

use crate::classification::QuestionClassification;
use crate::curriculum::{Grade, Subject};
use crate::error::Result;
use crate::session::ChatMessage;

const SUMMARY_SNIPPET_CHARS: usize = 150;

#[derive(Serialize)]
struct DrawingDirective<'a> {
    required: bool,
    confidence: u8,
    reason: &'a str,
}

/// Renders tutor prompts from the bundled templates.
pub struct PromptComposer {
    env: Environment<'static>,
}

impl PromptComposer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        for &(name, source) in templates::ALL {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Composes the prompt for one question.
    ///
    /// `context` is embedded verbatim when non-blank.
    pub fn compose(
        &self,
        question: &str,
        classification: &QuestionClassification,
        grade: Grade,
        subject: Subject,
        context: Option<&str>,
        history_summary: Option<&str>,
    ) -> Result<String> {
        let template_name = match subject {
            Subject::English => templates::ENGLISH_TUTOR,
            _ => templates::TUTOR,
        };
        let template = self.env.get_template(template_name)?;

        let drawing = DrawingDirective {
            required: classification.needs_drawing,
            confidence: classification.drawing_confidence,
            reason: &classification.drawing_reason,
        };

        let rendered = template.render(context! {
            question => question.trim(),
            subject_name => subject.display_name(),
            profile => grade_profile(grade),
            canvas => SVG_CANVAS,
            guidance => subject_guidance(subject),
            general_guidance => !classification.is_educational,
            drawing => drawing,
            context => context.filter(|c| !c.trim().is_empty()),
            history_summary => history_summary.filter(|s| !s.trim().is_empty()),
            references_previous => classification.has_references || classification.is_clarification,
            is_correction => classification.is_correction,
        })?;
        Ok(rendered)
    }
}

/// Summarises the most recent `max_turns` turns, oldest first.
///
/// Returns `None` for an empty history.
pub fn history_summary(history: &[ChatMessage], max_turns: usize) -> Option<String> {
    if history.is_empty() || max_turns == 0 {
        return None;
    }
    let start = history.len().saturating_sub(max_turns);
    let lines: Vec<String> = history[start..]
        .iter()
        .map(|message| {
            let speaker = if message.is_user() { "الطفل" } else { "المعلم" };
            format!("- {speaker}: {}", snippet(message.display_text()))
        })
        .collect();
    Some(lines.join("\n"))
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SUMMARY_SNIPPET_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(SUMMARY_SNIPPET_CHARS).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::classify;
    use crate::session::{ChatRole, ChatSession, MessageExtras};

    fn composer() -> PromptComposer {
        PromptComposer::new().expect("templates compile")
    }

    #[test]
    fn test_context_is_embedded_verbatim() {
        let question = "اشرح لي جمع 2+3";
        let classification = classify(question, &[]);
        let context = "[مصدر 1] (Math/unit1.txt)\nالجمع: 2 + 3 = 5 <b>&</b> {{ not a tag }}";

        let prompt = composer()
            .compose(
                question,
                &classification,
                Grade::Grade2,
                Subject::Math,
                Some(context),
                None,
            )
            .unwrap();

        assert!(prompt.contains(context));
        assert!(prompt.contains("المعلومات المسترجعة"));
        assert!(prompt.contains("الصف الثاني الابتدائي"));
    }

    #[test]
    fn test_drawing_block_follows_classification() {
        let c = composer();

        let visual = classify("ارسم لي مثلثاً", &[]);
        let prompt = c
            .compose("ارسم لي مثلثاً", &visual, Grade::Grade1, Subject::Math, None, None)
            .unwrap();
        assert!(prompt.contains("مطلوبة لهذا السؤال"));
        assert!(prompt.contains("width=\"700\""));
        assert!(prompt.contains("#FF6B6B, #4ECDC4, #45B7D1, #FED766, #2AB7CA"));
        assert!(prompt.contains("100px"));
        assert!(prompt.contains("100/100"));

        let textual = classify("احكي لي قصة عن الصدق", &[]);
        let prompt = c
            .compose(
                "احكي لي قصة عن الصدق",
                &textual,
                Grade::Grade1,
                Subject::Islamic,
                None,
                None,
            )
            .unwrap();
        assert!(prompt.contains("غير مطلوبة"));
        assert!(!prompt.contains("width=\"700\""));
        assert!(!prompt.contains("المعلومات المسترجعة"));
    }

    #[test]
    fn test_output_contract_is_present() {
        let classification = classify("ما هي أجزاء النبات؟", &[]);
        let prompt = composer()
            .compose(
                "ما هي أجزاء النبات؟",
                &classification,
                Grade::Grade3,
                Subject::Science,
                None,
                None,
            )
            .unwrap();
        assert!(prompt.contains("`text_explanation` و `svg_code`"));
        assert!(prompt.contains("\"ما هي أجزاء النبات؟\""));
        assert!(prompt.contains("مخطط تدفق"));
    }

    #[test]
    fn test_english_subject_uses_english_contract() {
        let classification = classify("Teach me the letter B", &[]);
        let prompt = composer()
            .compose(
                "Teach me the letter B",
                &classification,
                Grade::Grade1,
                Subject::English,
                None,
                None,
            )
            .unwrap();
        assert!(prompt.contains("Smart English Tutor"));
        assert!(prompt.contains("Simple English explanation here"));
        assert!(prompt.contains("MUST be JSON only"));
    }

    #[test]
    fn test_history_summary_block() {
        let mut session = ChatSession::new(Grade::Grade1, Subject::Math);
        session.append(ChatRole::User, "ما هو المربع؟", MessageExtras::default());
        session.append(
            ChatRole::Assistant,
            "{...}",
            MessageExtras {
                explanation: Some("المربع شكل له أربعة أضلاع متساوية".into()),
                ..Default::default()
            },
        );
        session.append(ChatRole::User, "لم افهم هذا", MessageExtras::default());

        let summary = history_summary(session.history(), 2).unwrap();
        assert_eq!(
            summary,
            "- المعلم: المربع شكل له أربعة أضلاع متساوية\n- الطفل: لم افهم هذا"
        );

        let classification = classify("لم افهم هذا", &session.history()[..2]);
        let prompt = composer()
            .compose(
                "لم افهم هذا",
                &classification,
                Grade::Grade1,
                Subject::Math,
                None,
                Some(&summary),
            )
            .unwrap();
        assert!(prompt.contains("ملخص المحادثة السابقة"));
        assert!(prompt.contains(&summary));
        assert!(prompt.contains("يشير إلى موضوع سابق"));
    }

    #[test]
    fn test_history_summary_truncates_and_handles_empty() {
        assert!(history_summary(&[], 4).is_none());

        let mut session = ChatSession::default();
        session.append(ChatRole::User, "ب".repeat(400), MessageExtras::default());
        let summary = history_summary(session.history(), 4).unwrap();
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() < 200);
    }
}
