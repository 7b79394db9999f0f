use scraper::Html;
use url::Url;

use crate::common::constants::{DEFAULT_DESCRIPTION, DEFAULT_VENDOR_INFO, NOT_AVAILABLE};
use crate::common::types::MarketDraft;
use crate::extract::{
    categorize, clean_text, extract_dates_or, extract_location, normalize, truncate, LinkSet,
    LocationScope,
};

/// Per-page inputs handed to a strategy.
pub struct ExtractContext<'a> {
    /// The literal source URL; copied into every draft's `source_url`.
    pub source_url: &'a str,
    /// `source_url` parsed, for resolving relative hrefs.
    pub base: &'a Url,
    /// Run-wide ceiling on candidate elements inspected per page.
    pub max_candidates: usize,
}

impl<'a> ExtractContext<'a> {
    pub fn new(source_url: &'a str, base: &'a Url, max_candidates: usize) -> Self {
        Self {
            source_url,
            base,
            max_candidates,
        }
    }

    /// The smaller of a strategy's own cap and the run-wide ceiling.
    pub fn cap(&self, strategy_cap: usize) -> usize {
        strategy_cap.min(self.max_candidates)
    }
}

/// An extraction procedure bound to a class of source pages.
pub trait SiteStrategy: Send + Sync {
    /// Stable identifier used in logs and the `sources` listing
    fn name(&self) -> &'static str;

    /// Whether the page must be fetched and parsed. Hand-authored strategies
    /// return `false` and are called with an empty document.
    fn requires_page(&self) -> bool {
        true
    }

    /// Produce zero or more drafts. Candidates that fail a check are skipped;
    /// a strategy never fails as a whole.
    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft>;
}

/// How a strategy fills the inferred fields of a draft.
#[derive(Debug, Clone, Copy)]
pub struct DraftStyle {
    pub scope: LocationScope,
    pub dates_fallback: &'static str,
    pub description_chars: usize,
}

/// Build a draft for `name` from its surrounding `context` text and links.
pub fn draft_from_context(
    name: &str,
    context: &str,
    links: LinkSet,
    ctx: &ExtractContext<'_>,
    style: DraftStyle,
) -> MarketDraft {
    let name = normalize(name);
    let description = truncate(&clean_text(context), style.description_chars);
    let description = if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description
    };
    let category = categorize(&name, &description);

    // The context opens with the candidate's own heading, and a name ending in
    // "Market" or "Park" must not be read back as its own venue.
    let location_text = normalize(context).replace(name.as_str(), " ");

    MarketDraft::new(name, ctx.source_url)
        .with_location(extract_location(&location_text, style.scope))
        .with_dates(extract_dates_or(context, style.dates_fallback))
        .with_website(links.website.unwrap_or_else(|| NOT_AVAILABLE.to_string()))
        .with_vendor_info(
            links
                .vendor_info
                .unwrap_or_else(|| DEFAULT_VENDOR_INFO.to_string()),
        )
        .with_category(category)
        .with_description(description)
}
