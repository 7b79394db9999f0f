use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use tracing::debug;

use crate::app::ports::HttpClientPort;
use crate::common::error::{Result, ScraperError};

/// reqwest-backed fetcher that presents itself as a desktop browser.
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-CA,en;q=0.9")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!(url = %url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
