use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_CATEGORY, DEFAULT_CITY_LOCATION, DEFAULT_DATES, DEFAULT_DESCRIPTION,
    DEFAULT_VENDOR_INFO, NOT_AVAILABLE,
};

/// A candidate market produced by one extraction pass over a heading,
/// list item or card. Every field is populated at construction; the
/// `with_*` builders consume the draft and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub dates: String,
    pub website: String,
    pub vendor_info: String,
    pub source_url: String,
    pub category: String,
}

impl MarketDraft {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            location: DEFAULT_CITY_LOCATION.to_string(),
            dates: DEFAULT_DATES.to_string(),
            website: NOT_AVAILABLE.to_string(),
            vendor_info: DEFAULT_VENDOR_INFO.to_string(),
            source_url: source_url.into(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    pub fn with_dates(self, dates: impl Into<String>) -> Self {
        Self {
            dates: dates.into(),
            ..self
        }
    }

    pub fn with_website(self, website: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            ..self
        }
    }

    pub fn with_vendor_info(self, vendor_info: impl Into<String>) -> Self {
        Self {
            vendor_info: vendor_info.into(),
            ..self
        }
    }

    pub fn with_category(self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self
        }
    }
}

/// A draft after deduplication, stamped with the run date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub name: String,
    pub description: String,
    pub location: String,
    pub dates: String,
    pub website: String,
    pub vendor_info: String,
    pub source_url: String,
    pub category: String,
    pub scraped_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_application_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

impl MarketRecord {
    /// Finalize a draft, replacing any blank field with its default.
    /// `source_url` is carried through untouched.
    pub fn finalize(draft: MarketDraft, scraped_date: NaiveDate) -> Self {
        Self {
            name: draft.name,
            description: or_default(draft.description, DEFAULT_DESCRIPTION),
            location: or_default(draft.location, DEFAULT_CITY_LOCATION),
            dates: or_default(draft.dates, DEFAULT_DATES),
            website: or_default(draft.website, NOT_AVAILABLE),
            vendor_info: or_default(draft.vendor_info, DEFAULT_VENDOR_INFO),
            source_url: draft.source_url,
            category: or_default(draft.category, DEFAULT_CATEGORY),
            scraped_date,
            vendor_application_available: None,
            ai_enhanced: None,
        }
    }

    /// True when `vendor_info` points somewhere rather than holding a default.
    pub fn has_vendor_application(&self) -> bool {
        self.vendor_info != NOT_AVAILABLE && self.vendor_info != DEFAULT_VENDOR_INFO
    }
}

/// Successful run payload.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSuccess {
    pub success: bool,
    pub markets: Vec<MarketRecord>,
    pub count: usize,
    pub processed_urls: usize,
    pub total_urls: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancement_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeFailure {
    pub success: bool,
    pub error: String,
}

/// The JSON object returned to callers of the CLI and HTTP surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScrapeResponse {
    Success(ScrapeSuccess),
    Failure(ScrapeFailure),
}

impl ScrapeResponse {
    pub fn failure(error: impl std::fmt::Display) -> Self {
        ScrapeResponse::Failure(ScrapeFailure {
            success: false,
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResponse::Success(_))
    }
}
