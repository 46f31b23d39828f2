//! Keyword tables and the ordered drawing-confidence rules.
//!
//! All phrases are written in normalised form (see [`crate::text::normalize`]):
//! no diacritics, alef variants folded to ا, lowercase Latin.

use once_cell::sync::Lazy;
use regex::Regex;

/// A compiled keyword table.
///
/// Arabic phrases match as substrings. Latin phrases (and every entry of a
/// word table) are anchored on word boundaries so "hi" does not fire inside
/// "this".
pub struct PatternTable {
    regex: Regex,
}

impl PatternTable {
    fn phrases(entries: &[&str]) -> Self {
        Self::build(entries, false)
    }

    fn words(entries: &[&str]) -> Self {
        Self::build(entries, true)
    }

    fn build(entries: &[&str], all_bounded: bool) -> Self {
        let alternation = entries
            .iter()
            .map(|entry| {
                let escaped = regex::escape(entry);
                if all_bounded || entry.is_ascii() {
                    format!(r"\b{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("(?:{alternation})")).expect("valid keyword table");
        Self { regex }
    }

    pub fn is_match(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }

    /// `normalized` with every match replaced by a space.
    pub fn strip(&self, normalized: &str) -> String {
        self.regex.replace_all(normalized, " ").into_owned()
    }
}

/// Greeting and small-talk phrases, matched as whole words.
pub static GREETINGS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::words(&[
        "السلام عليكم",
        "وعليكم السلام",
        "مرحبا",
        "اهلا وسهلا",
        "اهلا",
        "صباح الخير",
        "مساء الخير",
        "حياك الله",
        "شكرا",
        "كيف حالك",
        "ما اسمك",
        "من انت",
        "هل انت ذكي",
        "كم عمرك",
        "ماذا تفعل",
        "hello",
        "hi",
        "hey",
        "good morning",
        "good evening",
        "how are you",
        "thank you",
        "thanks",
    ])
});

pub static EDUCATIONAL: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "علمني",
        "اشرح",
        "ما هو",
        "ما هي",
        "ماهو",
        "ماهي",
        "ما معنى",
        "وضح",
        "اريد ان اتعلم",
        "الدرس",
        "كيف",
        "لماذا",
        "احسب",
        "teach me",
        "what is",
        "what are",
        "explain",
        "how",
        "why",
    ])
});

/// Short intent words that would fire inside longer words ("مراحل").
pub static EDUCATIONAL_WORDS: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::words(&["حل", "solve"]));

pub static EXPLICIT_DRAWING: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "ارسم",
        "رسم",
        "صورة",
        "مخطط",
        "كيف يبدو",
        "كيف تبدو",
        "draw",
        "show me a picture",
        "picture",
        "diagram",
    ])
});

pub static TEXT_ONLY: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "قاعدة",
        "قواعد",
        "تعريف",
        "معنى",
        "قصة",
        "قصص",
        "حكاية",
        "حديث",
        "story",
        "definition",
        "rule",
        "meaning",
    ])
});

pub static HIGH_PRIORITY_VISUAL: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "جمع",
        "طرح",
        "ضرب",
        "قسمة",
        "رقم",
        "ارقام",
        "كسر",
        "شكل هندسي",
        "اشكال",
        "مثلث",
        "دائرة",
        "مربع",
        "مستطيل",
        "اجزاء",
        "نبات",
        "حيوان",
        "زهرة",
        "جسم الانسان",
        "دورة حياة",
        "حرف",
        "حروف",
        "احرف",
        "وضوء",
        "letter",
        "alphabet",
        "triangle",
        "circle",
        "square",
        "shape",
    ])
});

pub static ARITHMETIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9٠-٩]+\s*[+\-×x*/÷]\s*[0-9٠-٩]+").expect("valid arithmetic regex")
});

pub static MEDIUM_PRIORITY_VISUAL: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "طقس",
        "مطر",
        "شمس",
        "غيوم",
        "رياح",
        "فصول السنة",
        "لون",
        "الوان",
        "احمر",
        "ازرق",
        "اخضر",
        "اصفر",
        "كبير",
        "صغير",
        "طويل",
        "قصير",
        "color",
        "weather",
        "big",
        "small",
    ])
});

pub static REFERENCES: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::words(&[
        "هذا",
        "هذه",
        "ذلك",
        "تلك",
        "عنه",
        "عنها",
        "السابق",
        "السابقة",
        "it",
        "this",
        "that",
        "previous",
    ])
});

pub static CLARIFICATION: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "لم افهم",
        "ما فهمت",
        "مش فاهم",
        "وضح اكثر",
        "اشرح اكثر",
        "مرة اخرى",
        "اعد الشرح",
        "بطريقة اخرى",
        "ابسط",
        "don't understand",
        "explain again",
        "simpler",
    ])
});

pub static CORRECTION: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "خطا",
        "غلط",
        "غير صحيح",
        "ليس صحيح",
        "صحح",
        "wrong",
        "not correct",
        "mistake",
    ])
});

pub static INTERROGATIVE: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::words(&["كيف", "اين", "متى", "لماذا", "how", "where", "when", "why"])
});

pub static MATH_VOCABULARY: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::phrases(&[
        "جمع",
        "طرح",
        "ضرب",
        "قسمة",
        "رقم",
        "ارقام",
        "عدد",
        "اعداد",
        "حساب",
        "احسب",
        "كسر",
        "زائد",
        "ناقص",
        "يساوي",
        "add",
        "subtract",
        "multiply",
        "divide",
        "number",
        "plus",
        "minus",
    ])
});

/// Boolean signals extracted from a normalised question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub explicit_drawing: bool,
    pub text_only: bool,
    pub high_priority_visual: bool,
    pub arithmetic: bool,
    pub medium_priority_visual: bool,
    pub has_references: bool,
    pub is_clarification: bool,
    pub is_educational: bool,
    pub interrogative: bool,
}

/// One row of the drawing-confidence table.
pub struct DrawingRule {
    pub reason: &'static str,
    pub confidence: u8,
    pub applies: fn(&Signals) -> bool,
}

/// Ordered drawing rules. The first rule whose predicate holds decides the
/// confidence; the last row always applies.
pub static DRAWING_RULES: &[DrawingRule] = &[
    DrawingRule {
        reason: "طلب رسم صريح",
        confidence: 100,
        applies: explicit_drawing,
    },
    DrawingRule {
        reason: "موضوع نصي لا يحتاج رسماً",
        confidence: 10,
        applies: text_only,
    },
    DrawingRule {
        reason: "موضوع بصري عالي الأولوية",
        confidence: 90,
        applies: high_priority_visual,
    },
    DrawingRule {
        reason: "عملية حسابية",
        confidence: 85,
        applies: arithmetic,
    },
    DrawingRule {
        reason: "موضوع بصري متوسط الأولوية",
        confidence: 70,
        applies: medium_priority_visual,
    },
    DrawingRule {
        reason: "طلب توضيح لموضوع سابق",
        confidence: 80,
        applies: clarifies_previous_topic,
    },
    DrawingRule {
        reason: "سؤال تعليمي استفهامي",
        confidence: 60,
        applies: educational_interrogative,
    },
    DrawingRule {
        reason: "سؤال تعليمي",
        confidence: 50,
        applies: educational,
    },
    DrawingRule {
        reason: "سؤال عام",
        confidence: 20,
        applies: always,
    },
];

fn explicit_drawing(s: &Signals) -> bool {
    s.explicit_drawing
}

fn text_only(s: &Signals) -> bool {
    s.text_only && !s.high_priority_visual
}

fn high_priority_visual(s: &Signals) -> bool {
    s.high_priority_visual
}

fn arithmetic(s: &Signals) -> bool {
    s.arithmetic
}

fn medium_priority_visual(s: &Signals) -> bool {
    s.medium_priority_visual
}

fn clarifies_previous_topic(s: &Signals) -> bool {
    s.has_references && s.is_clarification
}

fn educational_interrogative(s: &Signals) -> bool {
    s.is_educational && s.interrogative
}

fn educational(s: &Signals) -> bool {
    s.is_educational
}

fn always(_: &Signals) -> bool {
    true
}

/// Evaluates [`DRAWING_RULES`] in order.
pub fn drawing_decision(signals: &Signals) -> &'static DrawingRule {
    DRAWING_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .unwrap_or(&DRAWING_RULES[DRAWING_RULES.len() - 1])
}
