use std::collections::BTreeMap;

use crate::{
    config::{CloudinaryConfig, SignatureAlgorithm},
    error::{RelayError, Result},
    models::storage::{StoredMedia, UploadOptions},
    storage::traits::MediaStore,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub struct CloudinaryStore {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    algorithm: SignatureAlgorithm,
    base_url: String,
}

impl CloudinaryStore {
    pub fn new(config: &CloudinaryConfig) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &CloudinaryConfig) -> Result<Self> {
        let cloud_name = config
            .cloud_name
            .clone()
            .ok_or_else(|| RelayError::ConfigError("Cloudinary cloud name is required".into()))?;

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RelayError::ConfigError("Cloudinary API key is required".into()))?;

        let api_secret = config
            .api_secret
            .clone()
            .ok_or_else(|| RelayError::ConfigError("Cloudinary API secret is required".into()))?;

        Ok(Self {
            client,
            cloud_name,
            api_key,
            api_secret,
            algorithm: config.signature_algorithm,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name)
    }

    /// Hex digest over the sorted `key=value` pairs joined with `&`, followed
    /// by the API secret. Every form field except `file` and `api_key` must be
    /// in `params`.
    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        let to_sign = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        match self.algorithm {
            SignatureAlgorithm::Sha1 => digest::<Sha1>(&to_sign, &self.api_secret),
            SignatureAlgorithm::Sha256 => digest::<Sha256>(&to_sign, &self.api_secret),
        }
    }

    fn signed_params(&self, options: &UploadOptions, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", options.folder.clone());
        if let Some(format) = &options.format {
            params.insert("format", format.clone());
        }
        params.insert("timestamp", timestamp.to_string());
        params
    }
}

fn digest<D: Digest>(to_sign: &str, secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn store_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, data: Vec<u8>, options: UploadOptions) -> Result<StoredMedia> {
        let params = self.signed_params(&options, Utc::now().timestamp());
        let signature = self.sign(&params);

        log::info!(
            "Uploading {} bytes to media store folder '{}'",
            data.len(),
            options.folder
        );

        let file_name = format!("upload.{}", options.format.as_deref().unwrap_or("bin"));
        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(data).file_name(file_name))
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::StoreError(format!("Media store request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RelayError::StoreError(format!("Failed to read media store response: {}", e))
        })?;

        if !status.is_success() {
            log::error!("Media store returned {}: {}", status, text);
            return Err(RelayError::StoreError(store_error_message(&text)));
        }

        let stored: StoredMedia = serde_json::from_str(&text).map_err(|e| {
            RelayError::StoreError(format!("Invalid response from media store: {}", e))
        })?;

        log::info!("Stored media as {}", stored.public_id);
        Ok(stored)
    }
}
