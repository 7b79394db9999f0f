// Per-site extraction: strategy trait, URL-based registry and the built-in strategies

pub mod base;
pub mod registry;
pub mod strategies;

pub use base::{ExtractContext, SiteStrategy};
pub use registry::StrategyRegistry;
