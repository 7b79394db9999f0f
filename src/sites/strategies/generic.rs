use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::common::constants::DEFAULT_DATES;
use crate::common::types::MarketDraft;
use crate::extract::dom::{element_text, gather_context, nearby_links};
use crate::extract::{is_market_name, LocationScope};
use crate::sites::base::{draft_from_context, DraftStyle, ExtractContext, SiteStrategy};

static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("valid heading selector"));

const MAX_HEADINGS: usize = 10;
const MIN_CONTEXT_CHARS: usize = 100;

const STYLE: DraftStyle = DraftStyle {
    scope: LocationScope::City,
    dates_fallback: DEFAULT_DATES,
    description_chars: 300,
};

/// Fallback for any page no other strategy claims: every heading that reads
/// like a market name becomes a draft.
pub struct GenericStrategy;

impl SiteStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        document
            .select(&HEADINGS)
            .take(ctx.cap(MAX_HEADINGS))
            .filter_map(|heading| {
                let name = element_text(heading);
                if !is_market_name(&name) {
                    return None;
                }
                let context = gather_context(heading, MIN_CONTEXT_CHARS, STYLE.description_chars);
                let links = nearby_links(heading, true, ctx.base);
                Some(draft_from_context(&name, &context, links, ctx, STYLE))
            })
            .collect()
    }
}
