use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::app::ports::{CompletionPort, HttpClientPort};
use crate::common::error::{Result, ScraperError};
use crate::common::types::{MarketDraft, MarketRecord, ScrapeResponse, ScrapeSuccess};
use crate::config::Config;
use crate::infra::{OpenAiClient, ReqwestHttp};
use crate::metrics::ScrapeMetrics;
use crate::pipeline::dedupe::{dedupe, DedupeOptions};
use crate::pipeline::enhance::Enhancer;
use crate::sites::{ExtractContext, SiteStrategy, StrategyRegistry};

/// A source that contributed nothing because it failed.
#[derive(Debug, Clone)]
pub struct SourceError {
    pub url: String,
    pub message: String,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub markets: Vec<MarketRecord>,
    pub processed_urls: usize,
    pub total_urls: usize,
    pub source_errors: Vec<SourceError>,
    /// `None` when enhancement was not attempted.
    pub ai_enhanced: Option<bool>,
    pub enhancement_error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl From<ScrapeReport> for ScrapeResponse {
    fn from(report: ScrapeReport) -> Self {
        ScrapeResponse::Success(ScrapeSuccess {
            success: true,
            count: report.markets.len(),
            markets: report.markets,
            processed_urls: report.processed_urls,
            total_urls: report.total_urls,
            timestamp: report.finished_at,
            ai_enhanced: report.ai_enhanced,
            enhancement_error: report.enhancement_error,
        })
    }
}

/// Parse `markup` and run `strategy` over it. Kept synchronous so the parsed
/// document never lives across an await point.
pub fn extract_from_markup(
    strategy: &dyn SiteStrategy,
    markup: &str,
    ctx: &ExtractContext<'_>,
) -> Vec<MarketDraft> {
    let document = Html::parse_document(markup);
    strategy.extract(&document, ctx)
}

/// Concatenate successful sources in order; failures go to the error list.
fn fold_outcomes(
    outcomes: Vec<(&str, Result<Vec<MarketDraft>>)>,
) -> (Vec<MarketDraft>, Vec<SourceError>) {
    outcomes.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut drafts, mut errors), (url, outcome)| {
            match outcome {
                Ok(found) => {
                    info!(url = %url, drafts = found.len(), "source scraped");
                    drafts.extend(found);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "source failed, skipping");
                    ScrapeMetrics::record_source_error();
                    errors.push(SourceError {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
            }
            (drafts, errors)
        },
    )
}

/// Sequential harvest over the configured sources: fetch, extract, dedupe,
/// then optionally enhance.
pub struct MarketPipeline {
    config: Config,
    http: Arc<dyn HttpClientPort>,
    completion: Option<Arc<dyn CompletionPort>>,
    registry: StrategyRegistry,
}

impl MarketPipeline {
    pub fn new(
        config: Config,
        http: Arc<dyn HttpClientPort>,
        completion: Option<Arc<dyn CompletionPort>>,
    ) -> Self {
        Self {
            config,
            http,
            completion,
            registry: StrategyRegistry::new(),
        }
    }

    /// Pipeline backed by reqwest and, when a key is configured, OpenAI.
    pub fn from_config(config: Config) -> Result<Self> {
        let http = Arc::new(ReqwestHttp::new(&config.user_agent, config.fetch_timeout())?);
        let completion = if config.enhancement_active() {
            OpenAiClient::from_config(&config.enhancement)
                .map(|client| Arc::new(client) as Arc<dyn CompletionPort>)
        } else {
            None
        };
        Ok(Self::new(config, http, completion))
    }

    pub fn with_registry(self, registry: StrategyRegistry) -> Self {
        Self { registry, ..self }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Each configured source paired with the strategy it resolves to.
    pub fn source_plan(&self) -> Vec<(String, &'static str)> {
        self.config
            .sources
            .iter()
            .map(|url| (url.clone(), self.registry.select(url).name()))
            .collect()
    }

    fn enhancer(&self) -> Option<Enhancer> {
        if !self.config.enhancement.enabled {
            return None;
        }
        self.completion.as_ref().map(|completion| {
            Enhancer::new(
                Arc::clone(completion),
                self.config.enhancement.batch_size,
                self.config.enhancement_timeout(),
            )
        })
    }

    /// Run once. Per-source failures are logged and skipped; only a problem
    /// with the run itself is returned as an error.
    #[instrument(skip(self), fields(sources = self.config.sources.len()))]
    pub async fn run(&self) -> Result<ScrapeReport> {
        self.config.validate()?;
        let started = Instant::now();

        let total_urls = self.config.sources.len();
        let selected = &self.config.sources[..total_urls.min(self.config.max_sources_per_run)];
        let pacing = self.config.pacing_delay();

        let mut outcomes: Vec<(&str, Result<Vec<MarketDraft>>)> =
            Vec::with_capacity(selected.len());
        for (i, url) in selected.iter().enumerate() {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            let source_started = Instant::now();
            let outcome = self.scrape_source(url).await;
            if let Ok(found) = &outcome {
                ScrapeMetrics::record_source_success(
                    found.len(),
                    source_started.elapsed().as_secs_f64(),
                );
            }
            outcomes.push((url.as_str(), outcome));
        }

        let (drafts, source_errors) = fold_outcomes(outcomes);

        let draft_count = drafts.len();
        let unique = dedupe(
            drafts,
            &DedupeOptions::from(&self.config.dedupe),
            Utc::now().date_naive(),
        );
        ScrapeMetrics::record_unique_records(unique.len());
        info!(drafts = draft_count, unique = unique.len(), "deduplicated drafts");

        let (markets, ai_enhanced, enhancement_error) = match self.enhancer() {
            Some(enhancer) if !unique.is_empty() => {
                let outcome = enhancer.enhance(unique).await;
                ScrapeMetrics::record_enhancement(outcome.enhanced);
                (outcome.markets, Some(outcome.enhanced), outcome.error)
            }
            _ => (unique, None, None),
        };

        ScrapeMetrics::record_run(started.elapsed().as_secs_f64());
        info!(
            processed = selected.len(),
            failed = source_errors.len(),
            markets = markets.len(),
            "run complete"
        );

        Ok(ScrapeReport {
            markets,
            processed_urls: selected.len(),
            total_urls,
            source_errors,
            ai_enhanced,
            enhancement_error,
            finished_at: Utc::now(),
        })
    }

    /// `run` mapped onto the JSON response shape.
    pub async fn respond(&self) -> ScrapeResponse {
        match self.run().await {
            Ok(report) => report.into(),
            Err(e) => {
                error!(error = %e, "scrape run failed");
                ScrapeResponse::failure(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn scrape_source(&self, url: &str) -> Result<Vec<MarketDraft>> {
        let base = Url::parse(url)?;
        let strategy = self.registry.select(url);
        let ctx = ExtractContext::new(url, &base, self.config.max_candidates_per_source);

        if !strategy.requires_page() {
            return Ok(strategy.extract(&Html::new_document(), &ctx));
        }

        let timeout = self.config.fetch_timeout();
        let markup = tokio::time::timeout(timeout, self.http.get(url))
            .await
            .map_err(|_| ScraperError::Timeout {
                what: format!("fetch of {}", url),
                secs: timeout.as_secs(),
            })??;

        Ok(extract_from_markup(strategy, &markup, &ctx))
    }
}
