//! Question classification.
//!
//! Labels an incoming question with the flags the pipeline branches on:
//! whether it is a greeting, whether curriculum lookup is worthwhile, and how
//! strongly a diagram would help. The result is a pure function of the
//! question text and the prior chat history.

pub mod rules;

use serde::{Deserialize, Serialize};

use crate::session::ChatMessage;
use crate::text::normalize;
use rules::{
    ARITHMETIC, CLARIFICATION, CORRECTION, EDUCATIONAL, EDUCATIONAL_WORDS, EXPLICIT_DRAWING,
    GREETINGS,
    HIGH_PRIORITY_VISUAL, INTERROGATIVE, MATH_VOCABULARY, MEDIUM_PRIORITY_VISUAL, REFERENCES,
    Signals, TEXT_ONLY, drawing_decision,
};

/// Minimum confidence at which a diagram is requested.
pub const DRAWING_THRESHOLD: u8 = 50;

/// Questions with more tokens than this count as educational even without an
/// intent phrase.
const EDUCATIONAL_TOKEN_COUNT: usize = 3;

/// Words a greeting may carry besides the greeting itself ("يا معلمي").
const GREETING_FILLER_TOKENS: usize = 2;

const GREETING_REASON: &str = "تحية";

/// Flags computed for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionClassification {
    pub is_greeting: bool,
    pub is_educational: bool,
    pub needs_curriculum_search: bool,
    pub needs_drawing: bool,
    /// 0-100 estimate of how much a diagram would help.
    pub drawing_confidence: u8,
    pub drawing_reason: String,
    pub is_math_question: bool,
    pub has_references: bool,
    pub is_clarification: bool,
    pub is_correction: bool,
}

impl QuestionClassification {
    fn greeting() -> Self {
        Self {
            is_greeting: true,
            is_educational: false,
            needs_curriculum_search: false,
            needs_drawing: false,
            drawing_confidence: 0,
            drawing_reason: GREETING_REASON.to_string(),
            is_math_question: false,
            has_references: false,
            is_clarification: false,
            is_correction: false,
        }
    }
}

/// Classifies `question` given the turns that preceded it.
pub fn classify(question: &str, history: &[ChatMessage]) -> QuestionClassification {
    let text = normalize(question);

    if is_greeting_only(&text) {
        return QuestionClassification::greeting();
    }

    let has_prior_answer = history.iter().any(ChatMessage::is_assistant);
    let token_count = text.split_whitespace().count();
    let arithmetic = ARITHMETIC.is_match(&text);
    let has_references = REFERENCES.is_match(&text);

    let signals = Signals {
        explicit_drawing: EXPLICIT_DRAWING.is_match(&text),
        text_only: TEXT_ONLY.is_match(&text),
        high_priority_visual: HIGH_PRIORITY_VISUAL.is_match(&text),
        arithmetic,
        medium_priority_visual: MEDIUM_PRIORITY_VISUAL.is_match(&text),
        has_references,
        is_clarification: has_prior_answer && CLARIFICATION.is_match(&text),
        is_educational: has_educational_intent(&text) || token_count > EDUCATIONAL_TOKEN_COUNT,
        interrogative: INTERROGATIVE.is_match(&text),
    };

    let rule = drawing_decision(&signals);

    QuestionClassification {
        is_greeting: false,
        is_educational: signals.is_educational,
        needs_curriculum_search: signals.is_educational,
        needs_drawing: rule.confidence >= DRAWING_THRESHOLD,
        drawing_confidence: rule.confidence,
        drawing_reason: rule.reason.to_string(),
        is_math_question: arithmetic || MATH_VOCABULARY.is_match(&text),
        has_references,
        is_clarification: signals.is_clarification,
        is_correction: has_prior_answer && CORRECTION.is_match(&text),
    }
}

fn has_educational_intent(text: &str) -> bool {
    EDUCATIONAL.is_match(text) || EDUCATIONAL_WORDS.is_match(text)
}

/// A greeting with nothing to answer beyond it.
///
/// Once the greeting phrases are removed, the rest must be short filler with
/// no question, drawing request or arithmetic in it.
fn is_greeting_only(text: &str) -> bool {
    if !GREETINGS.is_match(text) {
        return false;
    }
    let rest = GREETINGS.strip(text);
    if has_educational_intent(&rest) || EXPLICIT_DRAWING.is_match(&rest) || ARITHMETIC.is_match(&rest) {
        return false;
    }
    rest.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
        <= GREETING_FILLER_TOKENS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ChatRole, ChatSession, MessageExtras};

    fn history_with_answer() -> Vec<ChatMessage> {
        let mut session = ChatSession::default();
        session.append(ChatRole::User, "ما هو المثلث؟", MessageExtras::default());
        session.append(
            ChatRole::Assistant,
            "المثلث شكل له ثلاثة أضلاع",
            MessageExtras::default(),
        );
        session.history().to_vec()
    }

    #[test]
    fn test_greeting_short_circuits() {
        let c = classify("السلام عليكم", &[]);
        assert!(c.is_greeting);
        assert!(!c.needs_curriculum_search);
        assert!(!c.needs_drawing);
        assert_eq!(c.drawing_confidence, 0);

        let c = classify("أهلاً، ارسم لي مثلثاً", &history_with_answer());
        assert!(!c.is_greeting);
        assert!(c.needs_drawing);
    }

    #[test]
    fn test_greeting_only_questions() {
        let cases = [
            "السلام عليكم",
            "مرحباً يا معلمي",
            "صباح الخير، كيف حالك؟",
            "شكراً جزيلاً",
            "ماذا تفعل؟",
            "من أنت",
            "hello, how are you?",
            "thanks!",
        ];
        for question in cases {
            let c = classify(question, &[]);
            assert!(c.is_greeting, "{question}");
            assert!(!c.needs_curriculum_search, "{question}");
        }
    }

    #[test]
    fn test_questions_opening_with_small_talk_are_answered() {
        let cases = [
            "ماذا تفعل النحلة في الزهرة؟",
            "كم عمرك إذا ولدت قبل ٧ سنوات وأضفنا ٣؟",
            "شكرا، والآن اشرح لي الضرب 3×4",
            "مرحبا، كم يساوي 5+6",
            "السلام عليكم، لماذا تسقط الأمطار؟",
        ];
        for question in cases {
            let c = classify(question, &[]);
            assert!(!c.is_greeting, "{question}");
            assert!(c.needs_curriculum_search, "{question}");
        }
    }

    #[test]
    fn test_short_intent_word_is_bounded() {
        assert!(!classify("مراحل", &[]).is_educational);
        assert!(!classify("الحليب", &[]).is_educational);
        assert!(classify("حل 4", &[]).is_educational);
    }

    #[test]
    fn test_arithmetic_question() {
        let c = classify("اشرح لي جمع 2+3", &[]);
        assert!(c.is_math_question);
        assert!(c.drawing_confidence >= 85);
        assert!(c.needs_drawing);
        assert!(c.needs_curriculum_search);
    }

    #[test]
    fn test_bare_expression_scores_arithmetic_rule() {
        let c = classify("٧ × ٨", &[]);
        assert_eq!(c.drawing_confidence, 85);
        assert!(c.is_math_question);
    }

    #[test]
    fn test_explicit_drawing_request() {
        let c = classify("ارسم لي قطة", &[]);
        assert_eq!(c.drawing_confidence, 100);
        assert!(c.needs_drawing);

        let c = classify("Please draw a cat", &[]);
        assert_eq!(c.drawing_confidence, 100);
    }

    #[test]
    fn test_text_only_topic() {
        let c = classify("احكي لي قصة عن الصدق", &[]);
        assert_eq!(c.drawing_confidence, 10);
        assert!(!c.needs_drawing);
        assert!(c.is_educational);
    }

    #[test]
    fn test_high_priority_visual_overrides_text_only() {
        let c = classify("ما تعريف المثلث", &[]);
        assert_eq!(c.drawing_confidence, 90);
    }

    #[test]
    fn test_medium_priority_visual() {
        let c = classify("ما هو الطقس الممطر", &[]);
        assert_eq!(c.drawing_confidence, 70);
    }

    #[test]
    fn test_clarification_needs_prior_answer() {
        let question = "لم افهم هذا، وضح اكثر";

        let without = classify(question, &[]);
        assert!(without.has_references);
        assert!(!without.is_clarification);

        let with = classify(question, &history_with_answer());
        assert!(with.is_clarification);
        assert_eq!(with.drawing_confidence, 80);
        assert!(with.needs_drawing);
    }

    #[test]
    fn test_correction_needs_prior_answer() {
        assert!(!classify("هذا غلط", &[]).is_correction);
        assert!(classify("هذا غلط", &history_with_answer()).is_correction);
    }

    #[test]
    fn test_educational_interrogative_and_plain() {
        let c = classify("لماذا نحتاج إلى الماء", &[]);
        assert_eq!(c.drawing_confidence, 60);

        let c = classify("علمني عن الأمانة", &[]);
        assert_eq!(c.drawing_confidence, 50);
        assert!(c.needs_drawing);
    }

    #[test]
    fn test_short_non_educational_question() {
        let c = classify("نعم", &[]);
        assert!(!c.is_educational);
        assert!(!c.needs_curriculum_search);
        assert_eq!(c.drawing_confidence, 20);
        assert!(!c.needs_drawing);
    }
}
