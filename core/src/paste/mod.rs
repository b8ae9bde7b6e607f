//! External paste service
//!
//! Pastes are created with a single POST carrying the raw text as body. The
//! service answers with the public URL and an edit token; the deletion link is
//! derived from the token.

use crate::config::PasteConfig;
use crate::error::PasteError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// A published paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteArtifact {
    /// Public view URL
    pub view_url: String,
    /// Private deletion URL, only shown to the invoker
    pub delete_url: String,
}

/// Publishes text and returns its links
#[async_trait]
pub trait PastePublisher: Send + Sync {
    async fn publish(&self, title: Option<&str>, content: &str) -> Result<PasteArtifact, PasteError>;
}

#[derive(Debug, Deserialize)]
struct CreatePasteResponse {
    url: String,
    edit: String,
}

/// HTTP client for the paste service
#[derive(Clone)]
pub struct PasteClient {
    client: reqwest::Client,
    base_url: String,
    expiration_secs: u64,
}

impl PasteClient {
    pub fn new(client: reqwest::Client, config: &PasteConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            expiration_secs: config.expiration_secs,
        }
    }

    /// Deletion link for an edit token
    pub fn delete_url(&self, edit_token: &str) -> String {
        format!("{}/delete/{}", self.base_url, urlencoding::encode(edit_token))
    }
}

#[async_trait]
impl PastePublisher for PasteClient {
    async fn publish(&self, title: Option<&str>, content: &str) -> Result<PasteArtifact, PasteError> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(title) = title
            && !title.is_empty()
        {
            query.push(("title", title.to_string()));
        }
        query.push(("expiration", self.expiration_secs.to_string()));

        let response = self
            .client
            .post(format!("{}/create", self.base_url))
            .query(&query)
            .timeout(Duration::from_secs(30))
            .body(content.as_bytes().to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("error creating paste: {}", status);
            return Err(PasteError::Status(status.as_u16()));
        }

        let data: CreatePasteResponse = response
            .json()
            .await
            .map_err(|e| PasteError::InvalidResponse(e.to_string()))?;
        debug!("created paste {}", data.url);

        Ok(PasteArtifact {
            delete_url: self.delete_url(&data.edit),
            view_url: data.url,
        })
    }
}
