use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::common::constants::CHECK_WEBSITE_DATES;
use crate::common::types::MarketDraft;
use crate::extract::dom::{element_text, first_heading, nearby_links};
use crate::extract::{is_plausible_title, LocationScope};
use crate::sites::base::{draft_from_context, DraftStyle, ExtractContext, SiteStrategy};

static VENUE_BLOCKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[class*="event"], [class*="market"], [class*="program"], article"#)
        .expect("valid venue block selector")
});

const MAX_BLOCKS: usize = 10;

const STYLE: DraftStyle = DraftStyle {
    scope: LocationScope::City,
    dates_fallback: CHECK_WEBSITE_DATES,
    description_chars: 300,
};

/// A market operator's own site: blocks tagged as events, markets or
/// programs, named by their first heading.
pub struct OfficialVenueStrategy;

impl SiteStrategy for OfficialVenueStrategy {
    fn name(&self) -> &'static str {
        "official_venue"
    }

    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        let mut drafts = Vec::new();

        for block in document.select(&VENUE_BLOCKS).take(ctx.cap(MAX_BLOCKS)) {
            let Some(heading) = first_heading(block) else {
                continue;
            };
            let name = element_text(heading);
            // The operator's page is already about markets, so no keyword is required.
            if !is_plausible_title(&name) {
                debug!(name = %name, "venue block heading rejected");
                continue;
            }

            let context = element_text(block);
            let links = nearby_links(heading, false, ctx.base);
            drafts.push(draft_from_context(&name, &context, links, ctx, STYLE));
        }

        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::{DEFAULT_CITY_LOCATION, DEFAULT_VENDOR_INFO};
    use url::Url;

    const PAGE: &str = r#"
        <html><body>
          <header class="site-header"><h1>The Welcome Market</h1></header>
          <div class="market-card">
            <h3>Winter Edition</h3>
            <p>Handmade goods from newcomer entrepreneurs.</p>
            <a href="/vendors">Become a vendor</a>
          </div>
          <div class="program-block">
            <h3>Contact the team</h3>
          </div>
          <article><p>No heading in this one.</p></article>
        </body></html>
    "#;

    #[test]
    fn test_names_blocks_by_first_heading() {
        let source = "https://thewelcomemarket.ca/";
        let base = Url::parse(source).unwrap();
        let ctx = ExtractContext::new(source, &base, 20);
        let doc = Html::parse_document(PAGE);

        let drafts = OfficialVenueStrategy.extract(&doc, &ctx);
        assert_eq!(drafts.len(), 1);

        let draft = &drafts[0];
        assert_eq!(draft.name, "Winter Edition");
        assert_eq!(draft.vendor_info, "https://thewelcomemarket.ca/vendors");
        assert_ne!(draft.vendor_info, DEFAULT_VENDOR_INFO);
        assert_eq!(draft.dates, CHECK_WEBSITE_DATES);
        assert_eq!(draft.location, DEFAULT_CITY_LOCATION);
        assert_eq!(draft.category, "Artisan Market");
    }
}
