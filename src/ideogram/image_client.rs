use crate::{
    config::IdeogramConfig,
    error::{RelayError, Result},
    ideogram::GenerationService,
    models::{GenerateBody, GeneratedImages, ReframeBody, ReframedImage, RemixBody},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[derive(Clone)]
pub struct IdeogramClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IdeogramClient {
    pub fn new(config: &IdeogramConfig) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &IdeogramConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RelayError::ConfigError("Ideogram API key is required".into()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, R>(&self, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, operation);
        log::info!("Calling generation service: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Generation request failed: {:?}", e);
                RelayError::UpstreamError(format!("Generation request failed: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RelayError::UpstreamError(format!("Failed to read generation response: {}", e))
        })?;

        if !status.is_success() {
            log::error!("Generation service returned {}: {}", status, text);
            return Err(RelayError::UpstreamError(error_message(
                status.as_u16(),
                &text,
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            RelayError::UpstreamError(format!("Invalid response from generation service: {}", e))
        })
    }
}

/// Pulls the most specific message out of an error body.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json.get("error").and_then(|e| e.get("message")),
            json.get("error"),
            json.get("message"),
            json.get("detail"),
        ];
        if let Some(message) = candidates
            .into_iter()
            .flatten()
            .find_map(|value| value.as_str())
        {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Generation service returned status {}", status)
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl GenerationService for IdeogramClient {
    async fn generate(&self, prompt: &str, aspect_ratio: &str) -> Result<GeneratedImages> {
        self.post(
            "generate",
            &GenerateBody {
                prompt,
                aspect_ratio,
            },
        )
        .await
    }

    async fn reframe(&self, image_url: &str, aspect_ratio: &str) -> Result<ReframedImage> {
        self.post(
            "reframe",
            &ReframeBody {
                image_url,
                aspect_ratio,
            },
        )
        .await
    }

    async fn remix(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<GeneratedImages> {
        self.post(
            "remix",
            &RemixBody {
                image_url,
                prompt,
                aspect_ratio,
            },
        )
        .await
    }
}
