// Orchestration: per-source scraping, deduplication and optional enhancement

pub mod dedupe;
pub mod enhance;
pub mod runner;

pub use dedupe::{dedupe, fingerprint, DedupeOptions};
pub use enhance::{EnhancementOutcome, Enhancer};
pub use runner::{MarketPipeline, ScrapeReport, SourceError};
