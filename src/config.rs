use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::common::constants::{BROWSER_USER_AGENT, DEFAULT_SOURCES};
use crate::common::error::{Result, ScraperError};

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Run configuration. `Config::default()` is the hard-coded production setup;
/// a TOML file only needs the keys it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source pages in processing order
    pub sources: Vec<String>,
    pub max_sources_per_run: usize,
    pub max_candidates_per_source: usize,
    pub fetch_timeout_secs: u64,
    /// Pause between sources; zero disables pacing.
    pub pacing_delay_ms: u64,
    pub user_agent: String,
    pub enhancement: EnhancementConfig,
    pub dedupe: DedupeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Fingerprints are cut to this many characters; `None` keeps them whole.
    pub fingerprint_prefix: Option<usize>,
    pub min_fingerprint_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            max_sources_per_run: 10,
            max_candidates_per_source: 20,
            fetch_timeout_secs: 10,
            pacing_delay_ms: 500,
            user_agent: BROWSER_USER_AGENT.to_string(),
            enhancement: EnhancementConfig::default(),
            dedupe: DedupeConfig::default(),
        }
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            endpoint: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            batch_size: 12,
            timeout_secs: 15,
            enabled: true,
        }
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            fingerprint_prefix: Some(25),
            min_fingerprint_len: 4,
        }
    }
}

impl Config {
    /// Read a TOML file over the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise; environment overrides
    /// are applied and the result validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `OPENAI_API_KEY` and `MARKET_SCRAPER_MAX_SOURCES`.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("MARKET_SCRAPER_MAX_SOURCES").ok(),
        )
    }

    fn with_overrides(
        mut self,
        api_key: Option<String>,
        max_sources: Option<String>,
    ) -> Result<Self> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.enhancement.api_key = Some(key);
        }
        if let Some(raw) = max_sources {
            self.max_sources_per_run = raw.trim().parse().map_err(|_| {
                ScraperError::Config(format!("MARKET_SCRAPER_MAX_SOURCES is not a number: {}", raw))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(ScraperError::Config("no source URLs configured".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ScraperError::Config("fetch_timeout_secs must be positive".into()));
        }
        if self.enhancement.timeout_secs == 0 {
            return Err(ScraperError::Config(
                "enhancement.timeout_secs must be positive".into(),
            ));
        }
        if self.enhancement.batch_size == 0 {
            return Err(ScraperError::Config(
                "enhancement.batch_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Whether a run should call the completion capability at all.
    pub fn enhancement_active(&self) -> bool {
        self.enhancement.enabled
            && self
                .enhancement
                .api_key
                .as_deref()
                .map_or(false, |k| !k.trim().is_empty())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn enhancement_timeout(&self) -> Duration {
        Duration::from_secs(self.enhancement.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.len(), DEFAULT_SOURCES.len());
        assert!(!config.enhancement_active());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            max_sources_per_run = 3

            [enhancement]
            batch_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.max_sources_per_run, 3);
        assert_eq!(config.enhancement.batch_size, 5);
        assert_eq!(config.enhancement.model, "gpt-4o-mini");
        assert_eq!(config.dedupe.fingerprint_prefix, Some(25));
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("sk-test".into()), Some("4".into()))
            .unwrap();
        assert_eq!(config.max_sources_per_run, 4);
        assert!(config.enhancement_active());

        let blank = Config::default().with_overrides(Some("  ".into()), None).unwrap();
        assert!(!blank.enhancement_active());

        assert!(Config::default().with_overrides(None, Some("many".into())).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty = Config {
            sources: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(empty.validate(), Err(ScraperError::Config(_))));

        let zero = Config {
            fetch_timeout_secs: 0,
            ..Config::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_enhancement_batch() {
        let mut config = Config::default();
        config.enhancement.batch_size = 0;
        match config.validate() {
            Err(ScraperError::Config(msg)) => assert!(msg.contains("batch_size")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_enhancement_is_inactive_even_with_key() {
        let mut config = Config::default();
        config.enhancement.api_key = Some("sk-test".into());
        config.enhancement.enabled = false;
        assert!(!config.enhancement_active());
    }
}
