use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app::ports::CompletionPort;
use crate::common::error::{Result, ScraperError};
use crate::config::EnhancementConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for the enhancement step.
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Client for `config`, or `None` when no key is configured.
    pub fn from_config(config: &EnhancementConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, config.model.as_str(), config.endpoint.as_str()))
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "completion request failed");
                ScraperError::Capability(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "completion API error");
            return Err(ScraperError::Capability(format!(
                "completion API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScraperError::Capability(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ScraperError::Capability("empty completion response".into()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "completion finished"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let mut config = EnhancementConfig::default();
        assert!(OpenAiClient::from_config(&config).is_none());

        config.api_key = Some("sk-test".into());
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.model, "gpt-4o-mini");
    }

    #[test]
    fn test_reply_content_may_be_null() {
        let reply: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(reply.choices[0].message.content.is_none());
    }
}
