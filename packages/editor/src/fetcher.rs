//! Background byte sources
//!
//! The resolver only needs "bytes for this URL". Production code uses
//! [`HttpFetcher`]; tests plug in scripted implementations.

use crate::config::EditorConfig;
use crate::errors::{EditorError, FetchError};
use async_trait::async_trait;
use reqwest::Url;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes behind `url`. Any non-success response is an error.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP(S) GET
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &EditorConfig) -> Result<Self, EditorError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| EditorError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
