use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::common::constants::DEFAULT_DATES;
use crate::common::types::MarketDraft;
use crate::extract::dom::{anchors, element_text, gather_context, nearby_links};
use crate::extract::{extract_market_name, is_market_name, LinkSet, LocationScope};
use crate::sites::base::{draft_from_context, DraftStyle, ExtractContext, SiteStrategy};

static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").expect("valid heading selector"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid li selector"));

const MAX_HEADINGS: usize = 15;
const MAX_LIST_ITEMS: usize = 20;
const MIN_CONTEXT_CHARS: usize = 100;

// List items shorter than this are navigation links, not write-ups.
const MIN_LIST_ITEM_CHARS: usize = 20;

const STYLE: DraftStyle = DraftStyle {
    scope: LocationScope::Region,
    dates_fallback: DEFAULT_DATES,
    description_chars: 400,
};

/// Blog and news round-ups ("the best farmers markets in Toronto"): one draft
/// per market heading, then one per list item that names a market.
pub struct ListicleStrategy;

impl ListicleStrategy {
    fn from_headings(document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        document
            .select(&HEADINGS)
            .take(ctx.cap(MAX_HEADINGS))
            .filter_map(|heading| {
                let name = element_text(heading);
                if !is_market_name(&name) {
                    return None;
                }
                let context = gather_context(heading, MIN_CONTEXT_CHARS, STYLE.description_chars);
                let links = nearby_links(heading, false, ctx.base);
                Some(draft_from_context(&name, &context, links, ctx, STYLE))
            })
            .collect()
    }

    // The item itself is the link neighbourhood; its parent list would hand
    // every item the same first link.
    fn from_list_items(document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        document
            .select(&LIST_ITEMS)
            .take(ctx.cap(MAX_LIST_ITEMS))
            .filter_map(|item| {
                let text = element_text(item);
                if text.chars().count() < MIN_LIST_ITEM_CHARS {
                    return None;
                }
                let name = extract_market_name(&text);
                if !is_market_name(&name) {
                    debug!(item = %text, "list item does not name a market");
                    return None;
                }
                let links = LinkSet::from_anchors(anchors(item), ctx.base);
                Some(draft_from_context(&name, &text, links, ctx, STYLE))
            })
            .collect()
    }
}

impl SiteStrategy for ListicleStrategy {
    fn name(&self) -> &'static str {
        "listicle"
    }

    fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<MarketDraft> {
        let mut drafts = Self::from_headings(document, ctx);
        drafts.extend(Self::from_list_items(document, ctx));
        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::DEFAULT_REGION_LOCATION;
    use url::Url;

    const PAGE: &str = r#"
        <html><body>
          <nav><ul><li><a href="/">Home</a></li><li><a href="/eat">Eat &amp; Drink</a></li></ul></nav>
          <article>
            <section>
              <h2>Sorauren Farmers Market</h2>
              <p>Mondays year-round in Sorauren Park, with produce from local farms.</p>
              <a href="https://sorauren.example.org">Visit</a>
            </section>
            <section>
              <h2>Where to park</h2>
              <ol>
                <li>Wychwood Barns Farmers Market: Saturdays 8am-12pm at 601 Christie St.</li>
                <li>Our favourite coffee stop for a post-shopping latte</li>
              </ol>
            </section>
          </article>
        </body></html>
    "#;

    #[test]
    fn test_extracts_headings_and_list_items() {
        let source = "https://www.blogto.com/toronto/the_best_farmers_markets_in_toronto/";
        let base = Url::parse(source).unwrap();
        let ctx = ExtractContext::new(source, &base, 20);
        let doc = Html::parse_document(PAGE);

        let drafts = ListicleStrategy.extract(&doc, &ctx);
        let names: Vec<&str> = drafts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Sorauren Farmers Market", "Wychwood Barns Farmers Market"]);

        let heading_draft = &drafts[0];
        assert_eq!(heading_draft.website, "https://sorauren.example.org/");
        assert_eq!(heading_draft.location, "Sorauren Park");
        assert!(heading_draft.dates.contains("Mondays"));
        assert_eq!(heading_draft.category, "Farmers Market");

        let item_draft = &drafts[1];
        assert_eq!(item_draft.location, "601 Christie St.");
        assert!(item_draft.dates.contains("8am-12pm"));
        assert_ne!(item_draft.location, DEFAULT_REGION_LOCATION);
    }
}
