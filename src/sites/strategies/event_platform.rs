use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::common::constants::DEFAULT_DATES;
use crate::common::types::MarketDraft;
use crate::extract::dom::{anchors, element_text};
use crate::extract::{is_market_name, LinkSet, LocationScope};
use crate::sites::base::{draft_from_context, DraftStyle, ExtractContext, SiteStrategy};

static EVENT_CARD: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"[class*="event-card"], [class*="eventCard"], [class*="event-item"], [class*="search-event"], [class*="event-listing"]"#,
    )
    .expect("valid event card selector")
});

static CARD_TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"h1, h2, h3, h4, [class*="title"]"#).expect("valid card title selector")
});

const MAX_CARDS: usize = 20;

const STYLE: DraftStyle = DraftStyle {
    scope: LocationScope::Region,
    dates_fallback: DEFAULT_DATES,
    description_chars: 300,
};

/// Event aggregators (Eventbrite and friends): one draft per event card.
pub struct EventPlatformStrategy;

impl SiteStrategy for EventPlatformStrategy {
    fn name(&self) -> &'static str {
        "event_platform"
    }

    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        let mut drafts = Vec::new();

        for card in document.select(&EVENT_CARD).take(ctx.cap(MAX_CARDS)) {
            let Some(title) = card.select(&CARD_TITLE).next() else {
                debug!("event card without a title element");
                continue;
            };
            let name = element_text(title);
            if !is_market_name(&name) {
                debug!(name = %name, "event card title is not a market");
                continue;
            }

            let context = element_text(card);
            let links = LinkSet::from_anchors(anchors(card), ctx.base);
            drafts.push(draft_from_context(&name, &context, links, ctx, STYLE));
        }

        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const PAGE: &str = r#"
        <html><body>
          <div class="search-event-card">
            <h3>Junction Night Market</h3>
            <p>Fri, Aug 15 · 6:00 PM - 11:00 PM</p>
            <p>Dundas St West, Toronto</p>
            <a href="/e/junction-night-market-123">Details</a>
          </div>
          <div class="search-event-card">
            <h3>Intro to Pottery</h3>
            <a href="/e/pottery">Details</a>
          </div>
          <div class="search-event-card"><p>no title here</p></div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_market_cards_only() {
        let source = "https://www.eventbrite.ca/d/canada--toronto/markets/";
        let base = Url::parse(source).unwrap();
        let ctx = ExtractContext::new(source, &base, 20);
        let doc = Html::parse_document(PAGE);

        let drafts = EventPlatformStrategy.extract(&doc, &ctx);
        assert_eq!(drafts.len(), 1);

        let draft = &drafts[0];
        assert_eq!(draft.name, "Junction Night Market");
        assert_eq!(draft.website, "https://www.eventbrite.ca/e/junction-night-market-123");
        assert!(draft.dates.contains("Aug 15"), "got {}", draft.dates);
        assert!(draft.dates.contains("6:00 PM - 11:00 PM"), "got {}", draft.dates);
        assert_eq!(draft.category, "Night Market");
        assert_eq!(draft.source_url, source);
    }

    #[test]
    fn test_respects_candidate_cap() {
        let source = "https://www.eventbrite.ca/d/canada--toronto/markets/";
        let base = Url::parse(source).unwrap();
        let ctx = ExtractContext::new(source, &base, 0);
        let doc = Html::parse_document(PAGE);

        assert!(EventPlatformStrategy.extract(&doc, &ctx).is_empty());
    }
}
