use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::app::ports::CompletionPort;
use crate::common::error::{Result, ScraperError};
use crate::common::types::MarketRecord;

/// One object of the model's reply. Every field is optional; a missing or
/// blank value keeps the record's own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnhancedFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor_application_available: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PromptRecord<'a> {
    name: &'a str,
    description: &'a str,
    location: &'a str,
    dates: &'a str,
    category: &'a str,
    vendor_info: &'a str,
}

/// Records after the enhancement step, whether or not it applied.
#[derive(Debug, Clone)]
pub struct EnhancementOutcome {
    pub markets: Vec<MarketRecord>,
    pub enhanced: bool,
    pub error: Option<String>,
}

pub struct Enhancer {
    completion: Arc<dyn CompletionPort>,
    batch_size: usize,
    timeout: Duration,
}

impl Enhancer {
    pub fn new(completion: Arc<dyn CompletionPort>, batch_size: usize, timeout: Duration) -> Self {
        Self {
            completion,
            batch_size,
            timeout,
        }
    }

    /// Clean up the first `batch_size` records with one completion call.
    /// Never fails: any problem returns the input unchanged, flagged as not
    /// enhanced, with the reason attached.
    #[instrument(skip_all, fields(records = markets.len()))]
    pub async fn enhance(&self, markets: Vec<MarketRecord>) -> EnhancementOutcome {
        if markets.is_empty() {
            return EnhancementOutcome {
                markets,
                enhanced: false,
                error: None,
            };
        }

        let batch_len = markets.len().min(self.batch_size);
        match self.request(&markets[..batch_len]).await {
            Ok(fields) => {
                let applied = fields.len().min(batch_len);
                if applied == 0 {
                    warn!(batch = batch_len, "enhancement reply contained no records");
                    return EnhancementOutcome {
                        markets: mark_unenhanced(markets),
                        enhanced: false,
                        error: Some("enhancement reply contained no records".to_string()),
                    };
                }
                info!(batch = batch_len, applied, "enhancement applied");
                EnhancementOutcome {
                    markets: merge_enhancements(markets, &fields, batch_len),
                    enhanced: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "enhancement failed, keeping scraped records");
                EnhancementOutcome {
                    markets: mark_unenhanced(markets),
                    enhanced: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn request(&self, batch: &[MarketRecord]) -> Result<Vec<EnhancedFields>> {
        let prompt = build_prompt(batch)?;
        let reply = tokio::time::timeout(self.timeout, self.completion.complete(&prompt))
            .await
            .map_err(|_| ScraperError::Timeout {
                what: "enhancement".to_string(),
                secs: self.timeout.as_secs(),
            })??;

        let array = extract_json_array(&reply)
            .ok_or_else(|| ScraperError::Capability("reply contained no JSON array".into()))?;
        Ok(serde_json::from_str(array)?)
    }
}

/// Instruction sent to the completion capability for `batch`.
pub fn build_prompt(batch: &[MarketRecord]) -> Result<String> {
    let records: Vec<PromptRecord<'_>> = batch
        .iter()
        .map(|r| PromptRecord {
            name: &r.name,
            description: &r.description,
            location: &r.location,
            dates: &r.dates,
            category: &r.category,
            vendor_info: &r.vendor_info,
        })
        .collect();
    let records_json = serde_json::to_string_pretty(&records)?;

    Ok(format!(
        "You are cleaning up scraped listings of Toronto-area markets and pop-up events.\n\
         For each of the {count} records below, return an improved version.\n\
         - name: the market's proper name, without dates or marketing copy\n\
         - description: one or two plain sentences\n\
         - location: a venue or street address in the Toronto area if one is stated\n\
         - dates: a concise schedule, or \"TBD\"\n\
         - category: one of Farmers Market, Artisan Market, Pop-up Market, Vintage Market, Holiday Market, Night Market, Food Market, General Market\n\
         - vendor_application_available: true if vendors can apply\n\
         Respond with a JSON array only, one object per record, in the same order as the input.\n\n\
         Records:\n{records_json}",
        count = batch.len(),
        records_json = records_json,
    ))
}

/// The first balanced `[...]` in `reply`. Brackets inside JSON string
/// literals do not count, and prose after the array is ignored.
pub fn extract_json_array(reply: &str) -> Option<&str> {
    let start = reply.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in reply[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn pick(original: String, candidate: Option<String>) -> String {
    match candidate {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => original,
    }
}

/// Apply `fields` to the first `batch_len` records by position. Records past
/// the batch, or without a matching reply object, are left as scraped.
pub fn merge_enhancements(
    markets: Vec<MarketRecord>,
    fields: &[EnhancedFields],
    batch_len: usize,
) -> Vec<MarketRecord> {
    markets
        .into_iter()
        .enumerate()
        .map(|(i, record)| match fields.get(i).filter(|_| i < batch_len) {
            Some(update) => {
                let vendor_application_available = update
                    .vendor_application_available
                    .unwrap_or_else(|| record.has_vendor_application());
                MarketRecord {
                    name: pick(record.name, update.name.clone()),
                    description: pick(record.description, update.description.clone()),
                    location: pick(record.location, update.location.clone()),
                    dates: pick(record.dates, update.dates.clone()),
                    category: pick(record.category, update.category.clone()),
                    vendor_application_available: Some(vendor_application_available),
                    ai_enhanced: Some(true),
                    ..record
                }
            }
            None => unenhanced(record),
        })
        .collect()
}

fn unenhanced(record: MarketRecord) -> MarketRecord {
    MarketRecord {
        vendor_application_available: Some(record.has_vendor_application()),
        ai_enhanced: Some(false),
        ..record
    }
}

/// Flag every record as not enhanced, computing vendor availability locally.
pub fn mark_unenhanced(markets: Vec<MarketRecord>) -> Vec<MarketRecord> {
    markets.into_iter().map(unenhanced).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::common::types::MarketDraft;

    struct Canned(std::result::Result<String, String>);

    #[async_trait]
    impl CompletionPort for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.0.clone().map_err(ScraperError::Capability)
        }
    }

    struct Stalled;

    #[async_trait]
    impl CompletionPort for Stalled {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("[]".into())
        }
    }

    fn records() -> Vec<MarketRecord> {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        vec![
            MarketRecord::finalize(
                MarketDraft::new("holiday craft market 2025", "https://a.example/")
                    .with_vendor_info("https://a.example/apply"),
                date,
            ),
            MarketRecord::finalize(
                MarketDraft::new("Leslieville Flea", "https://b.example/"),
                date,
            ),
        ]
    }

    fn enhancer(port: impl CompletionPort + 'static, batch_size: usize) -> Enhancer {
        Enhancer::new(Arc::new(port), batch_size, Duration::from_secs(5))
    }

    #[test]
    fn test_extract_json_array_from_wrapped_reply() {
        let reply = "Sure! Here you go:\n```json\n[{\"name\": \"A\"}, {\"name\": \"B\"}]\n```\nAnything else?";
        assert_eq!(
            extract_json_array(reply),
            Some("[{\"name\": \"A\"}, {\"name\": \"B\"}]")
        );
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_extract_json_array_ignores_trailing_brackets() {
        let reply = "Here you go:\n[{\"name\": \"A\"}]\nNote: values in [brackets] were inferred.";
        assert_eq!(extract_json_array(reply), Some("[{\"name\": \"A\"}]"));

        let nested = r#"[{"name": "Stall [A]", "dates": "Sat \"[am]\""}] trailing ]"#;
        assert_eq!(
            extract_json_array(nested),
            Some(r#"[{"name": "Stall [A]", "dates": "Sat \"[am]\""}]"#)
        );
        assert_eq!(extract_json_array("[[1, 2], [3]"), None);
    }

    #[test]
    fn test_prompt_lists_records_in_order() {
        let prompt = build_prompt(&records()).unwrap();
        let first = prompt.find("holiday craft market 2025").unwrap();
        let second = prompt.find("Leslieville Flea").unwrap();
        assert!(first < second);
        assert!(prompt.contains("same order"));
    }

    #[tokio::test]
    async fn test_successful_reply_merges_by_position() {
        let reply = r#"Here:
            [
              {"name": "Holiday Craft Market", "dates": "", "category": "Artisan Market",
               "vendor_application_available": true},
              {"location": "Leslieville, Toronto"}
            ]"#;
        let outcome = enhancer(Canned(Ok(reply.into())), 10).enhance(records()).await;

        assert!(outcome.enhanced);
        assert!(outcome.error.is_none());
        let first = &outcome.markets[0];
        assert_eq!(first.name, "Holiday Craft Market");
        assert_eq!(first.dates, "TBD");
        assert_eq!(first.category, "Artisan Market");
        assert_eq!(first.ai_enhanced, Some(true));

        let second = &outcome.markets[1];
        assert_eq!(second.name, "Leslieville Flea");
        assert_eq!(second.location, "Leslieville, Toronto");
        assert_eq!(second.vendor_application_available, Some(false));
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let outcome = enhancer(Canned(Ok("I cannot help with that.".into())), 10)
            .enhance(records())
            .await;

        assert!(!outcome.enhanced);
        assert!(!outcome.error.as_deref().unwrap_or_default().is_empty());
        assert_eq!(outcome.markets[0].name, "holiday craft market 2025");
        assert_eq!(outcome.markets[0].ai_enhanced, Some(false));
        assert_eq!(outcome.markets[0].vendor_application_available, Some(true));
        assert_eq!(outcome.markets[1].vendor_application_available, Some(false));
    }

    #[tokio::test]
    async fn test_trailing_prose_after_array_still_merges() {
        let reply = "[{\"name\": \"Holiday Craft Market\"}]\nValues in [brackets] were guessed.";
        let outcome = enhancer(Canned(Ok(reply.into())), 10).enhance(records()).await;

        assert!(outcome.enhanced);
        assert_eq!(outcome.markets[0].name, "Holiday Craft Market");
    }

    #[tokio::test]
    async fn test_empty_reply_array_is_not_enhanced() {
        let outcome = enhancer(Canned(Ok("[]".into())), 10).enhance(records()).await;

        assert!(!outcome.enhanced);
        assert!(outcome.error.unwrap().contains("no records"));
        assert!(outcome.markets.iter().all(|m| m.ai_enhanced == Some(false)));
        assert_eq!(outcome.markets[0].name, "holiday craft market 2025");
    }

    #[tokio::test]
    async fn test_short_reply_enhances_only_matched_records() {
        let reply = r#"[{"name": "Holiday Craft Market"}]"#;
        let outcome = enhancer(Canned(Ok(reply.into())), 10).enhance(records()).await;

        assert!(outcome.enhanced);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.markets[0].ai_enhanced, Some(true));
        assert_eq!(outcome.markets[1].ai_enhanced, Some(false));
        assert_eq!(outcome.markets[1].name, "Leslieville Flea");
    }

    #[tokio::test]
    async fn test_malformed_array_falls_back() {
        let outcome = enhancer(Canned(Ok("[{\"name\": }]".into())), 10)
            .enhance(records())
            .await;
        assert!(!outcome.enhanced);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_capability_error_falls_back() {
        let outcome = enhancer(Canned(Err("quota exceeded".into())), 10)
            .enhance(records())
            .await;
        assert!(!outcome.enhanced);
        assert!(outcome.error.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let enhancer = Enhancer::new(Arc::new(Stalled), 10, Duration::from_millis(50));
        let outcome = enhancer.enhance(records()).await;
        assert!(!outcome.enhanced);
        assert!(outcome.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_records_past_batch_pass_through() {
        let reply = r#"[{"name": "Holiday Craft Market"}, {"name": "Should Not Apply"}]"#;
        let outcome = enhancer(Canned(Ok(reply.into())), 1).enhance(records()).await;

        assert!(outcome.enhanced);
        assert_eq!(outcome.markets[0].name, "Holiday Craft Market");
        assert_eq!(outcome.markets[1].name, "Leslieville Flea");
        assert_eq!(outcome.markets[1].ai_enhanced, Some(false));
    }
}
