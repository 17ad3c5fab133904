//! The request pipeline shared by every operation:
//! validate → generate → fetch → transcode → store → respond.

pub mod operations;

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::Config,
    error::{RelayError, Result},
    fetch::{HttpImageFetcher, ImageFetcher},
    ideogram::{GenerationService, IdeogramClient},
    logger,
    models::{GenerationRequest, OperationResult, ReframeRequest, RemixRequest, UploadOptions},
    storage::{CloudinaryStore, MediaStore},
    transcode::Transcoder,
};

pub use operations::{Generate, ImageOperation, Reframe, Remix};

#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn GenerationService>,
    fetcher: Arc<dyn ImageFetcher>,
    store: Arc<dyn MediaStore>,
    transcoder: Transcoder,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            generator,
            fetcher,
            store,
            transcoder: Transcoder::new(),
        }
    }

    /// Wires the real HTTP clients from `config`. One reqwest client is shared
    /// by all three.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::new();

        Ok(Self::new(
            Arc::new(IdeogramClient::with_client(http.clone(), &config.ideogram)?),
            Arc::new(HttpImageFetcher::new(http.clone())),
            Arc::new(CloudinaryStore::with_client(http, &config.cloudinary)?),
        ))
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<OperationResult> {
        self.run::<Generate>(request).await
    }

    pub async fn reframe(&self, request: ReframeRequest) -> Result<OperationResult> {
        self.run::<Reframe>(request).await
    }

    pub async fn remix(&self, request: RemixRequest) -> Result<OperationResult> {
        self.run::<Remix>(request).await
    }

    pub async fn run<O: ImageOperation>(&self, request: O::Request) -> Result<OperationResult> {
        let request_id = Uuid::new_v4();
        let _timer = logger::timer(&format!("{} [{}]", O::KIND, request_id));

        match self.execute::<O>(request).await {
            Ok(result) => {
                log::info!(
                    "{} [{}] stored {} as {}",
                    O::KIND,
                    request_id,
                    result.original_url,
                    result.stored_id
                );
                Ok(result)
            }
            Err(e) if e.is_validation() => {
                log::warn!("{} [{}] rejected: {}", O::KIND, request_id, e);
                Err(e)
            }
            Err(e) => {
                log::error!("{} [{}] failed: {:?}", O::KIND, request_id, e);
                Err(e)
            }
        }
    }

    async fn execute<O: ImageOperation>(&self, request: O::Request) -> Result<OperationResult> {
        let mut operation = O::validate(request)?;
        operation.prepare(self.store.as_ref()).await?;

        let original_url = operation
            .invoke(self.generator.as_ref())
            .await?
            .ok_or_else(|| RelayError::UpstreamError(O::MISSING_IMAGE.into()))?;
        log::debug!("{} produced {}", O::KIND, original_url);

        let raw = self.fetcher.fetch(&original_url).await?;
        let normalized = self.transcoder.transcode(&raw)?;

        let stored = self
            .store
            .upload(
                normalized,
                UploadOptions::new(O::NAMESPACE).with_format(self.transcoder.format_tag()),
            )
            .await?;

        Ok(OperationResult {
            success: true,
            original_url,
            stored_url: stored.secure_url,
            stored_id: stored.public_id,
        })
    }
}
