use url::Url;

const VENDOR_LINK_HINTS: &[&str] = &["vendor", "apply", "sign up", "registration"];

/// Resolve an href found on `base` into an absolute http(s) URL. Fragment-only
/// and non-navigational hrefs (`javascript:`, `mailto:`, `tel:`) yield `None`.
pub fn resolve_href(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:"].iter().any(|p| lower.starts_with(p)) {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Anchor text that points at a vendor application or sign-up flow.
pub fn is_vendor_link(text: &str) -> bool {
    let lower = text.to_lowercase();
    VENDOR_LINK_HINTS.iter().any(|hint| lower.contains(hint))
}

/// At most one website and one vendor link per candidate; the first link of
/// each kind wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    pub website: Option<String>,
    pub vendor_info: Option<String>,
}

impl LinkSet {
    /// Fold `(href, anchor text)` pairs into a link set.
    pub fn from_anchors<'a, I>(anchors: I, base: &Url) -> Self
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        anchors
            .into_iter()
            .fold(LinkSet::default(), |links, (href, text)| links.offer(href, &text, base))
    }

    fn offer(self, href: &str, text: &str, base: &Url) -> Self {
        let Some(url) = resolve_href(href, base) else {
            return self;
        };
        if is_vendor_link(text) {
            LinkSet {
                vendor_info: self.vendor_info.or(Some(url)),
                ..self
            }
        } else {
            LinkSet {
                website: self.website.or(Some(url)),
                ..self
            }
        }
    }
}
