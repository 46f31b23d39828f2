//! Arabic-aware text helpers shared by the classifier and the lesson index.

use once_cell::sync::Lazy;
use regex::Regex;

static ARABIC_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{0600}-\x{06FF}]+").expect("valid arabic script regex"));

/// Normalises text for keyword matching.
///
/// Lowercases, strips tashkeel (U+064B..U+0652, U+0670) and tatweel, folds
/// the alef variants أ إ آ ٱ to ا, and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}' => {}
            'أ' | 'إ' | 'آ' | 'ٱ' => out.push('ا'),
            c => out.extend(c.to_lowercase()),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the text contains at least one Arabic-script run.
pub fn contains_arabic(text: &str) -> bool {
    ARABIC_SCRIPT.is_match(text)
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Converts ASCII, Arabic-Indic (٠-٩) and Extended Arabic-Indic (۰-۹) digit
/// strings to a number.
pub fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for ch in text.chars() {
        let digit = match ch {
            '0'..='9' => ch as u32 - '0' as u32,
            '\u{0660}'..='\u{0669}' => ch as u32 - 0x0660,
            '\u{06F0}'..='\u{06F9}' => ch as u32 - 0x06F0,
            _ => return None,
        };
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_folds_alef() {
        assert_eq!(normalize("أهلاً وسهلاً"), "اهلا وسهلا");
        assert_eq!(normalize("  إلى   آخر "), "الى اخر");
        assert_eq!(normalize("Teach ME"), "teach me");
        assert_eq!(normalize("مـــرحبا"), "مرحبا");
    }

    #[test]
    fn test_contains_arabic() {
        assert!(contains_arabic("الجمع سهل"));
        assert!(!contains_arabic("addition is easy"));
    }

    #[test]
    fn test_parse_digits_handles_arabic_indic() {
        assert_eq!(parse_digits("12"), Some(12));
        assert_eq!(parse_digits("٣"), Some(3));
        assert_eq!(parse_digits("۱۰"), Some(10));
        assert_eq!(parse_digits("x1"), None);
        assert_eq!(parse_digits(""), None);
    }
}
