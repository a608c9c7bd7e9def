//! Canonical id derivation from free-text queries
//!
//! Topic ids are human-readable slugs built from the query that first created
//! the topic: stop words removed, at most three meaningful words, Arabic
//! script transliterated to Latin, truncated to a fixed length.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const MAX_SLUG_LEN: usize = 30;
const FALLBACK_SLUG: &str = "campus_query";

/// Detected script/language of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Arabic,
    English,
    Mixed,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arabic => "arabic",
            Self::English => "english",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

static ARABIC_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "في", "من", "على", "إلى", "عن", "مع", "هل", "ما", "كيف", "متى", "أين", "لماذا", "هذا",
        "هذه", "التي", "الذي", "أن", "ان", "كان", "يكون", "هي", "هو", "انا", "انت", "نحن", "شو",
        "وين", "ليش",
    ]
    .into_iter()
    .collect()
});

static ENGLISH_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "need", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
        "about", "when", "where", "why", "how", "what", "which", "who", "this", "that", "these",
        "those", "i", "me", "my", "we", "our", "you", "your", "it", "its", "and", "or", "not",
        "so", "than", "too", "very", "just",
    ]
    .into_iter()
    .collect()
});

fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// Detect whether a query is Arabic, English, or mixed
pub fn detect_language(text: &str) -> Language {
    let arabic = text.chars().filter(|c| is_arabic_char(*c)).count();
    let total = text.chars().filter(|c| c.is_alphabetic()).count();

    if total == 0 {
        return Language::Unknown;
    }

    let ratio = arabic as f64 / total as f64;

    if ratio > 0.5 {
        Language::Arabic
    } else if ratio > 0.0 {
        Language::Mixed
    } else {
        Language::English
    }
}

/// Normalize a query for matching and storage: collapse whitespace and
/// lowercase Latin script while leaving Arabic untouched.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| {
            if word.chars().any(is_arabic_char) {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a canonical slug from a query
///
/// Stop words are dropped, the first three meaningful words are joined with
/// underscores, Arabic is transliterated, and the result is truncated.
pub fn derive_slug(query: &str) -> String {
    let normalized = normalize_query(query);

    let meaningful: Vec<String> = normalized
        .split_whitespace()
        .map(strip_punctuation)
        .filter(|word| {
            word.chars().count() > 1
                && !ARABIC_STOP_WORDS.contains(word.as_str())
                && !ENGLISH_STOP_WORDS.contains(word.as_str())
        })
        .take(3)
        .collect();

    let raw = if meaningful.is_empty() {
        // fall back to the first word long enough to mean something
        normalized
            .split_whitespace()
            .map(strip_punctuation)
            .find(|word| word.chars().count() > 2)
            .unwrap_or_default()
    } else {
        meaningful.join("_")
    };

    let mut slug: String = raw
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || is_arabic_char(*c))
        .collect();

    if slug.chars().any(is_arabic_char) {
        slug = transliterate_arabic(&slug);
    }

    let slug = collapse_underscores(&slug);
    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_matches('_').to_string();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn strip_punctuation(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_underscore = false;

    for c in s.chars() {
        if c == '_' {
            if !last_underscore {
                out.push(c);
            }
            last_underscore = true;
        } else {
            out.push(c);
            last_underscore = false;
        }
    }

    out
}

/// Letter-by-letter Arabic to Latin transliteration for slug text
fn transliterate_arabic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            'ا' | 'أ' | 'آ' | 'ى' | 'ة' => out.push('a'),
            'إ' => out.push('i'),
            'ب' => out.push('b'),
            'ت' | 'ط' => out.push('t'),
            'ث' | 'ذ' => out.push_str("th"),
            'ج' => out.push('j'),
            'ح' | 'ه' => out.push('h'),
            'خ' => out.push_str("kh"),
            'د' => out.push('d'),
            'ر' => out.push('r'),
            'ز' | 'ظ' => out.push('z'),
            'س' | 'ص' => out.push('s'),
            'ش' => out.push_str("sh"),
            'ض' => out.push('d'),
            'ع' => out.push('a'),
            'غ' => out.push_str("gh"),
            'ف' => out.push('f'),
            'ق' => out.push('q'),
            'ك' => out.push('k'),
            'ل' => out.push('l'),
            'م' => out.push('m'),
            'ن' => out.push('n'),
            'و' | 'ؤ' => out.push('w'),
            'ي' | 'ئ' => out.push('y'),
            'ء' | 'ـ' => {}
            c if c.is_alphanumeric() || c == '_' => out.push(c),
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("course registration"), Language::English);
        assert_eq!(detect_language("تسجيل المواد"), Language::Arabic);
        assert_eq!(detect_language("خطة SE"), Language::Mixed);
        assert_eq!(detect_language("123 !!"), Language::Unknown);
    }

    #[test]
    fn test_normalize_query_lowercases_latin_only() {
        assert_eq!(
            normalize_query("  Course   REGISTRATION  "),
            "course registration"
        );
        assert_eq!(normalize_query("خطة SE"), "خطة se");
    }

    #[test]
    fn test_derive_slug_english() {
        assert_eq!(derive_slug("course registration"), "course_registration");
        assert_eq!(
            derive_slug("How do I register for courses?"),
            "register_courses"
        );
    }

    #[test]
    fn test_derive_slug_skips_stop_words() {
        assert_eq!(derive_slug("what are the tuition fees"), "tuition_fees");
    }

    #[test]
    fn test_derive_slug_arabic_transliterated() {
        let slug = derive_slug("تسجيل المواد");
        assert!(slug.is_ascii(), "slug should be ascii: {slug}");
        assert!(!slug.is_empty());
    }

    #[test]
    fn test_derive_slug_truncated() {
        let slug = derive_slug("extraordinarily comprehensive administrative procedures");
        assert!(slug.chars().count() <= MAX_SLUG_LEN);
    }

    #[test]
    fn test_derive_slug_fallback() {
        assert_eq!(derive_slug("?? !!"), FALLBACK_SLUG);
    }

    #[test]
    fn test_derive_slug_deterministic() {
        assert_eq!(
            derive_slug("scholarship deadlines"),
            derive_slug("scholarship deadlines")
        );
    }
}
