use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

// Anything outside word chars, whitespace and light punctuation.
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,;:()&]").expect("valid charset regex"));

/// Collapse whitespace runs to a single space and trim the ends.
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// `normalize`, after dropping characters outside `[\w\s-.,;:()&]`.
pub fn clean_text(text: &str) -> String {
    normalize(&DISALLOWED.replace_all(text, ""))
}

/// Keep at most `max_chars` characters, never splitting a code point.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
