use std::sync::Arc;

use tracing::debug;

use crate::sites::base::SiteStrategy;
use crate::sites::strategies::{
    EventPlatformStrategy, FlagshipStrategy, GenericStrategy, ListicleStrategy,
    OfficialVenueStrategy, VendorApplicationStrategy,
};

/// Decides whether a strategy applies to a lowercased source URL.
pub type UrlPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

const EVENT_PLATFORM_MARKERS: &[&str] =
    &["eventbrite.", "allevents.in", "meetup.com", "lu.ma", "facebook.com/events"];
const LISTICLE_MARKERS: &[&str] = &[
    "blogto.com",
    "torontolife.com",
    "narcity.com",
    "toronto.com",
    "dailyhive.com",
    "curiocity",
    "/blog",
];
const OFFICIAL_VENUE_MARKERS: &[&str] = &[
    "thewelcomemarket.ca",
    "torontoartisan.com",
    "artsmarket.ca",
    "distilleryheritage.com",
    "harbourfrontcentre.com",
];
const VENDOR_APPLICATION_MARKERS: &[&str] = &["vendor", "apply", "call-for", "exhibitor"];

/// Predicate matching URLs that contain any of `markers`.
pub fn url_contains_any(markers: &'static [&'static str]) -> UrlPredicate {
    Box::new(move |url: &str| markers.iter().any(|marker| url.contains(marker)))
}

/// Ordered `(predicate, strategy)` list; the first match wins and the
/// generic strategy handles everything else.
pub struct StrategyRegistry {
    entries: Vec<(UrlPredicate, Arc<dyn SiteStrategy>)>,
    fallback: Arc<dyn SiteStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Registry with the built-in strategies in priority order.
    pub fn new() -> Self {
        let flagship = Arc::new(FlagshipStrategy::new());
        let flagship_matcher = Arc::clone(&flagship);

        let mut registry = Self::empty();
        registry.register(
            Box::new(move |url: &str| flagship_matcher.handles(url)),
            flagship,
        );
        registry.register(
            url_contains_any(EVENT_PLATFORM_MARKERS),
            Arc::new(EventPlatformStrategy),
        );
        registry.register(url_contains_any(LISTICLE_MARKERS), Arc::new(ListicleStrategy));
        registry.register(
            url_contains_any(OFFICIAL_VENUE_MARKERS),
            Arc::new(OfficialVenueStrategy),
        );
        registry.register(
            url_contains_any(VENDOR_APPLICATION_MARKERS),
            Arc::new(VendorApplicationStrategy),
        );
        registry
    }

    /// Registry holding only the generic fallback.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            fallback: Arc::new(GenericStrategy),
        }
    }

    /// Append a strategy. Earlier registrations take precedence.
    pub fn register(&mut self, predicate: UrlPredicate, strategy: Arc<dyn SiteStrategy>) {
        self.entries.push((predicate, strategy));
    }

    /// Strategy for `url`. Total: falls back to the generic strategy.
    pub fn select(&self, url: &str) -> &dyn SiteStrategy {
        let lower = url.to_lowercase();
        let strategy = self
            .entries
            .iter()
            .find(|(predicate, _)| predicate(&lower))
            .map(|(_, strategy)| strategy.as_ref())
            .unwrap_or_else(|| self.fallback.as_ref());
        debug!(url = %url, strategy = strategy.name(), "selected strategy");
        strategy
    }

    /// Names of the registered strategies in priority order, fallback last.
    pub fn list_strategies(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|(_, strategy)| strategy.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }
}
