use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::FeedError;

/// Where the raw status document comes from.
/// One call per invocation, no retries.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FeedError>;
}

/// Fetches the status document over HTTP
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<String, FeedError> {
        let resp = self.client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            return Err(FeedError::UpstreamStatus(resp.status()));
        }

        let body = resp.text().await?;
        debug!(url = %self.url, bytes = body.len(), "fetched status feed");
        Ok(body)
    }
}
