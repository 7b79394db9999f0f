use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

use super::links::LinkSet;
use super::text::{normalize, truncate};

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("valid heading selector"));

const CONTEXT_SIBLING_TAGS: &[&str] = &["p", "div", "span", "li"];
const CONTEXT_SIBLINGS: usize = 3;

/// All descendant text of `el`, whitespace-normalized. Text nodes are joined
/// with a space so adjacent blocks do not run together.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn parent_text(el: ElementRef<'_>) -> String {
    parent_element(el).map(element_text).unwrap_or_default()
}

pub fn first_heading<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.select(&HEADING).next()
}

/// Description seed for a heading: the parent's text plus the next three
/// paragraph-like siblings, skipping links and images in between. Falls back
/// to the parent text alone when the combination is shorter than `min_chars`.
pub fn gather_context(el: ElementRef<'_>, min_chars: usize, max_chars: usize) -> String {
    let parent = parent_text(el);
    let siblings: Vec<String> = el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| CONTEXT_SIBLING_TAGS.contains(&sibling.value().name()))
        .take(CONTEXT_SIBLINGS)
        .map(element_text)
        .collect();

    let combined = normalize(&format!("{} {}", parent, siblings.join(" ")));
    let context = if combined.chars().count() < min_chars {
        parent
    } else {
        combined
    };
    truncate(&context, max_chars)
}

/// `(href, anchor text)` for every anchor under `el`.
pub fn anchors<'a>(el: ElementRef<'a>) -> Vec<(&'a str, String)> {
    el.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href").map(|href| (href, element_text(a))))
        .collect()
}

/// Links in the candidate's neighbourhood: anchors under its parent and,
/// when `include_self` is set, anchors inside the candidate itself.
pub fn nearby_links(el: ElementRef<'_>, include_self: bool, base: &Url) -> LinkSet {
    let mut found = parent_element(el).map(anchors).unwrap_or_default();
    if include_self {
        found.extend(anchors(el));
    }
    LinkSet::from_anchors(found, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const PAGE: &str = r#"
        <html><body>
          <section>
            <h2>Holiday Craft Market</h2>
            <p>Saturdays, 10am-4pm at 123 King St.</p>
            <span>Vendors welcome.</span>
            <a href="/apply">Apply Here</a>
            <a href="https://holidaycraft.ca">Website</a>
          </section>
        </body></html>
    "#;

    fn heading(doc: &Html) -> ElementRef<'_> {
        doc.select(&Selector::parse("h2").unwrap()).next().unwrap()
    }

    #[test]
    fn test_element_text_separates_nodes() {
        let doc = Html::parse_fragment("<div><b>Night</b><i>Market</i></div>");
        let div = doc.select(&Selector::parse("div").unwrap()).next().unwrap();
        assert_eq!(element_text(div), "Night Market");
    }

    #[test]
    fn test_gather_context_falls_back_to_parent_when_short() {
        let doc = Html::parse_document(PAGE);
        let context = gather_context(heading(&doc), 500, 400);
        assert_eq!(context, parent_text(heading(&doc)));
    }

    #[test]
    fn test_gather_context_appends_siblings_and_truncates() {
        let doc = Html::parse_document(PAGE);
        let context = gather_context(heading(&doc), 20, 400);
        assert!(context.starts_with("Holiday Craft Market Saturdays"));
        assert!(context.ends_with("Vendors welcome."));

        let short = gather_context(heading(&doc), 20, 30);
        assert_eq!(short.chars().count(), 30);
    }

    #[test]
    fn test_gather_context_skips_non_text_siblings() {
        let doc = Html::parse_document(
            r#"<section><h2>Leslieville Flea</h2><a href="/map">Map</a><img src="/flea.jpg">
               <p>one</p><p>two</p><p>three</p></section>"#,
        );
        let context = gather_context(heading(&doc), 0, 400);
        assert!(context.ends_with("one two three"), "got {}", context);
    }

    #[test]
    fn test_nearby_links_resolve_against_page() {
        let doc = Html::parse_document(PAGE);
        let base = Url::parse("https://example.com/events/").unwrap();
        let links = nearby_links(heading(&doc), true, &base);
        assert_eq!(links.vendor_info.as_deref(), Some("https://example.com/apply"));
        assert_eq!(links.website.as_deref(), Some("https://holidaycraft.ca/"));
    }
}
