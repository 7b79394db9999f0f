use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::common::types::{MarketDraft, MarketRecord};
use crate::config::DedupeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeOptions {
    /// Only this many fingerprint characters take part in comparison.
    pub fingerprint_prefix: Option<usize>,
    /// Fingerprints shorter than this are dropped outright.
    pub min_len: usize,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            fingerprint_prefix: Some(25),
            min_len: 4,
        }
    }
}

impl From<&DedupeConfig> for DedupeOptions {
    fn from(config: &DedupeConfig) -> Self {
        Self {
            fingerprint_prefix: config.fingerprint_prefix,
            min_len: config.min_fingerprint_len,
        }
    }
}

/// Lowercased alphanumeric characters of `name`, optionally cut to `prefix`.
pub fn fingerprint(name: &str, prefix: Option<usize>) -> String {
    let chars = name
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric());
    match prefix {
        Some(n) => chars.take(n).collect(),
        None => chars.collect(),
    }
}

/// Collapse drafts whose names share a fingerprint. The first draft seen
/// wins and output keeps discovery order.
pub fn dedupe(
    drafts: Vec<MarketDraft>,
    options: &DedupeOptions,
    scraped_date: NaiveDate,
) -> Vec<MarketRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for draft in drafts {
        let key = fingerprint(&draft.name, options.fingerprint_prefix);
        if key.chars().count() < options.min_len {
            debug!(name = %draft.name, "fingerprint too short, dropping");
            continue;
        }
        if !seen.insert(key) {
            debug!(name = %draft.name, "duplicate market, dropping");
            continue;
        }
        unique.push(MarketRecord::finalize(draft, scraped_date));
    }

    unique
}
