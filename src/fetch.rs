use async_trait::async_trait;
use reqwest::Client;

use crate::error::{RelayError, Result};

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Downloading generated image from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RelayError::FetchError(format!("Failed to download image: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::FetchError(format!("Failed to read image body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
