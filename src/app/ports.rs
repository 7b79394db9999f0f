use async_trait::async_trait;

use crate::common::error::Result;

// Fetch-side port: body of a successful GET as text.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
}

/// Text-completion capability used by the enhancement step. Implementations
/// return the raw model reply; parsing is the caller's job.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
