/// Default string values shared by the extractors, strategies and dedupe step.
/// These are emitted verbatim in the JSON payload, so downstream consumers
/// compare against them (e.g. "N/A" means no link was found).

// Location defaults
pub const DEFAULT_CITY_LOCATION: &str = "Toronto, ON";
pub const DEFAULT_REGION_LOCATION: &str = "Greater Toronto Area, ON";

// Schedule defaults
pub const DEFAULT_DATES: &str = "TBD";
pub const CHECK_WEBSITE_DATES: &str = "Check website for schedule";

// Link defaults
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_VENDOR_INFO: &str = "Contact organizer";

pub const DEFAULT_DESCRIPTION: &str = "Market details available on website";
pub const DEFAULT_CATEGORY: &str = "General Market";

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Pages visited on every run, in processing order.
pub const DEFAULT_SOURCES: &[&str] = &[
    "https://www.stlawrencemarket.com/",
    "https://www.evergreen.ca/",
    "https://thewelcomemarket.ca/",
    "https://www.torontoartisan.com/",
    "https://artsmarket.ca/",
    "https://www.blogto.com/toronto/the_best_farmers_markets_in_toronto/",
    "https://www.eventbrite.ca/d/canada--toronto/markets/",
    "https://www.torontoflea.com/vendors",
];

// Name bounds shared by the classifier and the draft builder
pub const MIN_NAME_CHARS: usize = 5;
pub const MAX_NAME_CHARS: usize = 150;

/// Upper bound on distinct schedule fragments joined into `dates`.
pub const MAX_DATE_MATCHES: usize = 3;
