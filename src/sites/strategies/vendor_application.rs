use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::common::constants::CHECK_WEBSITE_DATES;
use crate::common::types::MarketDraft;
use crate::extract::dom::{element_text, gather_context, nearby_links};
use crate::extract::{is_plausible_title, LinkSet, LocationScope};
use crate::sites::base::{draft_from_context, DraftStyle, ExtractContext, SiteStrategy};

static TOP_HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2").expect("valid heading selector"));

const MAX_HEADINGS: usize = 10;

// Headings with less surrounding text than this are navigation chrome.
const MIN_CONTEXT_CHARS: usize = 80;

const STYLE: DraftStyle = DraftStyle {
    scope: LocationScope::Region,
    dates_fallback: CHECK_WEBSITE_DATES,
    description_chars: 300,
};

/// Calls for vendors. The page itself is the application, so it becomes
/// the vendor link when no better anchor is found.
pub struct VendorApplicationStrategy;

impl SiteStrategy for VendorApplicationStrategy {
    fn name(&self) -> &'static str {
        "vendor_application"
    }

    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        let mut drafts = Vec::new();

        for heading in document.select(&TOP_HEADINGS).take(ctx.cap(MAX_HEADINGS)) {
            let name = element_text(heading);
            if !is_plausible_title(&name) {
                continue;
            }
            let context = gather_context(heading, 0, STYLE.description_chars);
            if context.chars().count() <= MIN_CONTEXT_CHARS {
                debug!(name = %name, "heading has too little context");
                continue;
            }

            let links = nearby_links(heading, false, ctx.base);
            let links = LinkSet {
                vendor_info: links.vendor_info.or_else(|| Some(ctx.base.to_string())),
                ..links
            };
            drafts.push(draft_from_context(&name, &context, links, ctx, STYLE));
        }

        drafts
    }
}
