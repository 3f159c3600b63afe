use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{EstuaryError, Result};
use crate::fetcher::Fetcher;

const FETCH_TIMEOUT_SECS: u64 = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .gzip(true)
            .brotli(true)
            .user_agent("estuary/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(EstuaryError::Fetch(format!("empty response from {}", url)));
        }

        Ok(body.to_vec())
    }
}
