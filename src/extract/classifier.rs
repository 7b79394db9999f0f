use crate::common::constants::{MAX_NAME_CHARS, MIN_NAME_CHARS};

/// Substrings that mark a piece of text as market-related.
pub const MARKET_KEYWORDS: &[&str] = &[
    "market",
    "farmers",
    "artisan",
    "craft",
    "vendor",
    "bazaar",
    "fair",
    "festival",
    "pop-up",
    "popup",
    "night market",
    "flea",
    "maker",
    "handmade",
    "expo",
];

/// Substrings that mark navigation chrome and boilerplate.
pub const EXCLUDE_WORDS: &[&str] = &[
    "about",
    "contact",
    "home",
    "search",
    "menu",
    "login",
    "privacy",
    "terms",
    "copyright",
    "subscribe",
    "click",
    "newsletter",
    "cookie",
    "sign in",
    "my account",
    "follow us",
];

fn within_name_bounds(text: &str) -> bool {
    let len = text.chars().count();
    (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Whether `text` reads like the name of a market.
///
/// Both keyword lists are matched as plain substrings of the lowercased
/// text, not whole words. A market literally called "Search Market" is
/// therefore rejected; that false negative is accepted.
pub fn is_market_name(text: &str) -> bool {
    let text = text.trim();
    if !within_name_bounds(text) {
        return false;
    }
    let lower = text.to_lowercase();
    contains_any(&lower, MARKET_KEYWORDS) && !contains_any(&lower, EXCLUDE_WORDS)
}

/// Looser check for pages already known to list markets: length bounds and
/// the exclude list apply, but no market keyword is required.
pub fn is_plausible_title(text: &str) -> bool {
    let text = text.trim();
    within_name_bounds(text) && !contains_any(&text.to_lowercase(), EXCLUDE_WORDS)
}
