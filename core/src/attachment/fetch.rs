//! Download attachment bodies from the platform's file store

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Reads the text of an attachment
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetcher over plain HTTP(S)
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl AttachmentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("fetching attachment {}", url);
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
