use once_cell::sync::Lazy;
use regex::Regex;

use super::classifier::is_market_name;
use super::text::{normalize, truncate};
use crate::common::constants::{
    DEFAULT_CATEGORY, DEFAULT_CITY_LOCATION, DEFAULT_DATES, DEFAULT_REGION_LOCATION,
    MAX_DATE_MATCHES,
};

/// Which default `extract_location` falls back to when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationScope {
    /// Pages about a single Toronto venue.
    City,
    /// Aggregators and listicles covering the wider region.
    Region,
}

impl LocationScope {
    pub fn default_location(self) -> &'static str {
        match self {
            LocationScope::City => DEFAULT_CITY_LOCATION,
            LocationScope::Region => DEFAULT_REGION_LOCATION,
        }
    }
}

// Ordered most specific first: a full street address must win over a bare
// venue phrase found in the same text. The leading guard keeps clock times
// ("11:00 PM ...") from reading as house numbers.
static STREET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^\w:.])(?P<addr>\d+\s+(?:[a-z][\w'.]*\s+){1,4}?(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Place|Pl|Court|Ct)\b\.?(?:\s+(?:East|West|North|South|E|W|N|S)\b)?(?:,\s*(?:Toronto|North York|Scarborough|Etobicoke|Mississauga|Brampton|Markham|Vaughan|Richmond Hill|Oakville|Pickering|Ajax)(?:,?\s*(?:ON|Ontario)\b)?)?)",
    )
    .expect("valid street address regex")
});

// Case-sensitive on purpose: the words before the venue type must be
// capitalised, so "near Trinity Bellwoods Park" yields the proper noun only.
static VENUE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:[A-Z][\w'&.-]*\s+){1,4}(?:Market|Centre|Center|Park|Square|Mall|Plaza|Hall|Arena)\b",
    )
    .expect("valid venue regex")
});

static DIRECTIONAL_TORONTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Downtown|Midtown|Uptown|North|South|East|West|Central)\s+Toronto\b")
        .expect("valid directional regex")
});

/// Neighbourhoods and GTA municipalities, matched as whole words.
pub const GAZETTEER: &[&str] = &[
    "Distillery District",
    "Liberty Village",
    "Kensington Market",
    "Leslieville",
    "Yorkville",
    "Roncesvalles",
    "Parkdale",
    "Danforth",
    "Riverdale",
    "The Junction",
    "Harbourfront",
    "Queen West",
    "The Annex",
    "North York",
    "East York",
    "Scarborough",
    "Etobicoke",
    "Mississauga",
    "Brampton",
    "Markham",
    "Vaughan",
    "Richmond Hill",
    "Oakville",
    "Burlington",
    "Milton",
    "Pickering",
    "Ajax",
    "Whitby",
    "Oshawa",
    "Newmarket",
    "Aurora",
];

static GAZETTEER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    GAZETTEER
        .iter()
        .map(|name| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
            (*name, Regex::new(&pattern).expect("valid gazetteer regex"))
        })
        .collect()
});

/// Infer a physical location from free text. Never fails: returns the
/// scope's default when no pattern matches.
pub fn extract_location(text: &str, scope: LocationScope) -> String {
    if let Some(addr) = STREET_ADDRESS.captures(text).and_then(|c| c.name("addr")) {
        return normalize(addr.as_str());
    }
    for pattern in [&*VENUE_PHRASE, &*DIRECTIONAL_TORONTO] {
        if let Some(m) = pattern.find(text) {
            return normalize(m.as_str());
        }
    }

    GAZETTEER_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| format!("{}, ON", name))
        .unwrap_or_else(|| scope.default_location().to_string())
}

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // weekdays, singular or plural ("Saturdays")
        r"(?i)\b(?:Mon|Tues|Wednes|Thurs|Fri|Satur|Sun)days?\b",
        // month + day, optional range and year
        r"(?i)\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:\s*[-–]\s*\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?\b",
        // time ranges: "10am-4pm", "9:00 AM - 1:30 PM"
        r"(?i)\b\d{1,2}(?::\d{2})?\s*(?:am|pm|a\.m\.|p\.m\.)\s*(?:-|–|—|to)\s*\d{1,2}(?::\d{2})?\s*(?:am|pm|a\.m\.|p\.m\.)",
        // recurrence
        r"(?i)\b(?:daily|weekly|bi-weekly|monthly|weekends?|every\s+(?:day|week|weekend|month)|seasonal(?:ly)?|year[- ]round|all\s+year)\b",
        // season + year
        r"(?i)\b(?:spring|summer|fall|autumn|winter|holiday\s+season)\s+\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid date regex"))
    .collect()
});

/// Collect up to `MAX_DATE_MATCHES` distinct schedule fragments, joined by
/// `"; "`, or `"TBD"` when nothing matches.
pub fn extract_dates(text: &str) -> String {
    extract_dates_or(text, DEFAULT_DATES)
}

/// `extract_dates` with a caller-chosen fallback.
pub fn extract_dates_or(text: &str, fallback: &str) -> String {
    let mut found: Vec<String> = Vec::new();
    'families: for pattern in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let fragment = normalize(m.as_str());
            if !found.iter().any(|f| f.eq_ignore_ascii_case(&fragment)) {
                found.push(fragment);
            }
            if found.len() >= MAX_DATE_MATCHES {
                break 'families;
            }
        }
    }

    if found.is_empty() {
        fallback.to_string()
    } else {
        found.join("; ")
    }
}

static NAME_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?\n:,\-–—]").expect("valid name split regex"));

const MARKET_NAME_FALLBACK_CHARS: usize = 60;

/// Pull a market name out of a longer block such as a list item: the first
/// segment between punctuation that is 10-100 chars and reads like a market
/// name, otherwise the first 60 characters of the block.
pub fn extract_market_name(text: &str) -> String {
    NAME_SPLIT
        .split(text)
        .map(normalize)
        .find(|segment| {
            let len = segment.chars().count();
            (10..=100).contains(&len) && is_market_name(segment)
        })
        .unwrap_or_else(|| truncate(&normalize(text), MARKET_NAME_FALLBACK_CHARS))
}

/// Ordered category table; the first row with a keyword hit wins.
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("Farmers Market", &["farmer", "produce"]),
    ("Artisan Market", &["artisan", "craft", "handmade", "maker"]),
    ("Pop-up Market", &["pop-up", "popup", "pop up"]),
    ("Vintage Market", &["vintage", "antique", "flea"]),
    ("Holiday Market", &["holiday", "christmas"]),
    ("Night Market", &["night"]),
    ("Food Market", &["food"]),
];

pub fn categorize(name: &str, description: &str) -> String {
    let haystack = format!("{} {}", name, description).to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(category, _)| category.to_string())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}
