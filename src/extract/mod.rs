//! Text heuristics that turn loose page text into market fields.

pub mod classifier;
pub mod dom;
pub mod links;
pub mod patterns;
pub mod text;

pub use classifier::{is_market_name, is_plausible_title};
pub use links::{is_vendor_link, resolve_href, LinkSet};
pub use patterns::{
    categorize, extract_dates, extract_dates_or, extract_location, extract_market_name,
    LocationScope,
};
pub use text::{clean_text, normalize, truncate};
