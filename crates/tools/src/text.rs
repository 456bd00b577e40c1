//! Tokenizing and matching helpers shared by the analyzers.
//!
//! Matching is case-insensitive and whole-word: a term (or multi-word phrase)
//! only matches when it lines up with token boundaries, so "now" never
//! matches inside "known".

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:['’-][A-Za-z0-9]+)*").expect("valid word regex"));

static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

static CAPS_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("valid caps regex"));

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));

/// Words of `text`, in order. Apostrophes and hyphens inside a word are kept.
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Sentences of `text` that contain at least one word.
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_RE
        .split(text)
        .filter(|s| WORD_RE.is_match(s))
        .collect()
}

pub fn sentence_count(text: &str) -> usize {
    sentences(text).len()
}

/// Vowel-group syllable estimate, at least one per word.
pub fn syllables(word: &str) -> usize {
    let lower: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    if lower.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &lower {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    // Silent trailing "e" ("make"), but not "le" ("simple").
    let n = lower.len();
    if count > 1 && lower[n - 1] == 'e' && !(n >= 2 && lower[n - 2] == 'l') {
        count -= 1;
    }
    count.max(1)
}

/// Number of all-caps words (two or more letters).
pub fn caps_words(text: &str) -> usize {
    CAPS_WORD_RE.find_iter(text).count()
}

pub fn has_digits(text: &str) -> bool {
    DIGIT_RE.is_match(text)
}

/// Lowercased token stream of a text, prepared for repeated term lookups.
#[derive(Debug, Clone)]
pub struct Normalized {
    padded: String,
    word_count: usize,
}

impl Normalized {
    pub fn new(text: &str) -> Self {
        let tokens = words(text);
        let word_count = tokens.len();
        let mut padded = String::with_capacity(text.len() + 2);
        padded.push(' ');
        for token in tokens {
            padded.push_str(&normalize_token(token));
            padded.push(' ');
        }
        Self { padded, word_count }
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn contains(&self, term: &str) -> bool {
        let needle = normalize_phrase(term);
        if needle.trim().is_empty() {
            return false;
        }
        self.padded.contains(&needle)
    }

    /// Occurrences of `term`, counting non-overlapping matches.
    pub fn count(&self, term: &str) -> usize {
        let needle = normalize_phrase(term);
        if needle.trim().is_empty() {
            return 0;
        }
        // Matches share their boundary space, so step back one char each time.
        let mut count = 0;
        let mut from = 0;
        while let Some(pos) = self.padded[from..].find(&needle) {
            count += 1;
            from += pos + needle.len() - 1;
        }
        count
    }

    /// Terms from `terms` present in the text, in table order.
    pub fn find<'a>(&self, terms: &'a [String]) -> Vec<&'a str> {
        terms
            .iter()
            .filter(|t| self.contains(t))
            .map(|t| t.as_str())
            .collect()
    }

    /// First word of the text, lowercased.
    pub fn first_word(&self) -> Option<&str> {
        self.padded.split_whitespace().next()
    }
}

fn normalize_token(token: &str) -> String {
    token.to_lowercase().replace('’', "'")
}

fn normalize_phrase(term: &str) -> String {
    let mut needle = String::from(" ");
    for token in words(term) {
        needle.push_str(&normalize_token(token));
        needle.push(' ');
    }
    needle
}

pub fn contains_term(text: &str, term: &str) -> bool {
    Normalized::new(text).contains(term)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Cut `text` to at most `max_chars` characters on a word boundary.
/// A single word longer than the budget is cut mid-word.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let mut out = String::new();
    for word in trimmed.split_whitespace() {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        return trimmed.chars().take(max_chars).collect();
    }
    out.trim_end_matches([',', ';', ':', '-']).trim_end().to_string()
}

/// Replace every whole-word, case-insensitive occurrence of `term`.
pub fn replace_term(text: &str, term: &str, replacement: &str) -> String {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term.trim()));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, regex::NoExpand(replacement)).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Lowercase the first character, leaving acronyms ("AI", "USA") alone.
pub fn lowercase_first(text: &str) -> String {
    let trimmed = text.trim_start();
    let first_word = trimmed.split_whitespace().next().unwrap_or("");
    let letters = first_word.chars().filter(|c| c.is_alphabetic()).count();
    let upper = first_word.chars().filter(|c| c.is_uppercase()).count();
    if letters > 1 && upper == letters {
        return trimmed.to_string();
    }

    let mut chars = trimmed.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join a prefix and a body with one space.
pub fn prefixed(prefix: &str, text: &str) -> String {
    format!("{} {}", prefix.trim_end(), text.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_keep_inner_apostrophes() {
        assert_eq!(
            words("Don't wait, it's 50% off!"),
            vec!["Don't", "wait", "it's", "50", "off"]
        );
    }

    #[test]
    fn test_sentence_count_ignores_empty_fragments() {
        assert_eq!(sentence_count("Hello there. How are you?!"), 2);
        assert_eq!(sentence_count("Try now"), 1);
        assert_eq!(sentence_count("..."), 0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(syllables("time"), 1);
        assert_eq!(syllables("simple"), 2);
        assert_eq!(syllables("analysis"), 4);
        assert_eq!(syllables("a"), 1);
        assert_eq!(syllables("42"), 1);
    }

    #[test]
    fn test_whole_word_matching() {
        let text = Normalized::new("Known for results. Order NOW, trusted by thousands");
        assert!(text.contains("now"));
        assert!(text.contains("trusted by"));
        assert!(!text.contains("own"));
        assert!(!text.contains("trusted for"));
        assert!(!text.contains("   "));
        assert_eq!(text.first_word(), Some("known"));
    }

    #[test]
    fn test_count_adjacent_matches() {
        let text = Normalized::new("now now now");
        assert_eq!(text.count("now"), 3);
        assert_eq!(text.count("now now"), 1);
    }

    #[test]
    fn test_truncate_words_on_boundary() {
        assert_eq!(truncate_words("Fast and Easy", 40), "Fast and Easy");
        assert_eq!(truncate_words("The quick brown fox jumps", 15), "The quick brown");
        assert_eq!(truncate_words("Supercalifragilistic", 5), "Super");
        assert_eq!(truncate_words("Save big, today only", 9), "Save big");
    }

    #[test]
    fn test_replace_term_whole_word_only() {
        assert_eq!(
            replace_term("Maybe try it, maybelline", "maybe", "definitely"),
            "definitely try it, maybelline"
        );
    }

    #[test]
    fn test_lowercase_first_keeps_acronyms() {
        assert_eq!(lowercase_first("Our tool saves time."), "our tool saves time.");
        assert_eq!(lowercase_first("AI writes copy"), "AI writes copy");
    }

    #[test]
    fn test_caps_and_rounding() {
        assert_eq!(caps_words("BIG sale on NOW I said"), 2);
        assert_eq!(round1(71.25), 71.3);
        assert_eq!(clamp_score(120.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
    }
}
