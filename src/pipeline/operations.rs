use async_trait::async_trait;

use crate::{
    error::{RelayError, Result},
    ideogram::GenerationService,
    models::{
        storage::{GENERATE_FOLDER, REFRAME_FOLDER, REMIX_FOLDER, TEMP_FOLDER},
        GenerationRequest, ReframeRequest, RemixRequest, UploadOptions,
    },
    storage::MediaStore,
};

/// Per-operation policy plugged into [`super::Pipeline::run`].
#[async_trait]
pub trait ImageOperation: Sized + Send + Sync {
    type Request: Send;

    const KIND: &'static str;
    /// Folder the normalized result is stored under.
    const NAMESPACE: &'static str;
    const MISSING_IMAGE: &'static str = "No images generated";

    fn validate(request: Self::Request) -> Result<Self>;

    async fn prepare(&mut self, _store: &dyn MediaStore) -> Result<()> {
        Ok(())
    }

    /// Calls the generation service and returns the URL of the image to keep.
    async fn invoke(&self, client: &dyn GenerationService) -> Result<Option<String>>;
}

#[derive(Debug)]
pub struct Generate {
    prompt: String,
    aspect_ratio: String,
}

#[async_trait]
impl ImageOperation for Generate {
    type Request = GenerationRequest;

    const KIND: &'static str = "generate";
    const NAMESPACE: &'static str = GENERATE_FOLDER;

    fn validate(request: GenerationRequest) -> Result<Self> {
        let prompt = request
            .prompt()
            .ok_or_else(|| RelayError::ValidationError("Prompt is required".into()))?
            .to_string();

        Ok(Self {
            prompt,
            aspect_ratio: request.aspect_ratio(),
        })
    }

    async fn invoke(&self, client: &dyn GenerationService) -> Result<Option<String>> {
        let images = client.generate(&self.prompt, &self.aspect_ratio).await?;
        Ok(images.first_url())
    }
}

#[derive(Debug)]
pub struct Reframe {
    image_url: String,
    aspect_ratio: String,
}

#[async_trait]
impl ImageOperation for Reframe {
    type Request = ReframeRequest;

    const KIND: &'static str = "reframe";
    const NAMESPACE: &'static str = REFRAME_FOLDER;
    const MISSING_IMAGE: &'static str = "No reframed image returned";

    fn validate(request: ReframeRequest) -> Result<Self> {
        let image_url = request
            .image_url()
            .ok_or_else(|| RelayError::ValidationError("Image URL is required".into()))?
            .to_string();

        Ok(Self {
            image_url,
            aspect_ratio: request.aspect_ratio(),
        })
    }

    async fn invoke(&self, client: &dyn GenerationService) -> Result<Option<String>> {
        let image = client.reframe(&self.image_url, &self.aspect_ratio).await?;
        Ok(image.url())
    }
}

#[derive(Debug)]
enum RemixSource {
    File(Vec<u8>),
    Url(String),
}

#[derive(Debug)]
pub struct Remix {
    source: RemixSource,
    prompt: String,
    aspect_ratio: String,
}

#[async_trait]
impl ImageOperation for Remix {
    type Request = RemixRequest;

    const KIND: &'static str = "remix";
    const NAMESPACE: &'static str = REMIX_FOLDER;

    fn validate(mut request: RemixRequest) -> Result<Self> {
        let source = if request.has_file() {
            RemixSource::File(request.image.take().unwrap_or_default())
        } else if let Some(url) = request.image_url() {
            RemixSource::Url(url.to_string())
        } else {
            return Err(RelayError::ValidationError(
                "Image file or image URL is required".into(),
            ));
        };

        let prompt = request
            .prompt()
            .ok_or_else(|| RelayError::ValidationError("Prompt is required".into()))?
            .to_string();

        Ok(Self {
            source,
            prompt,
            aspect_ratio: request.aspect_ratio(),
        })
    }

    /// An uploaded file has no URL the generation service can read, so it is
    /// parked in the temp folder first. The temp object is never deleted.
    async fn prepare(&mut self, store: &dyn MediaStore) -> Result<()> {
        if let RemixSource::File(bytes) = &mut self.source {
            let data = std::mem::take(bytes);
            let stored = store.upload(data, UploadOptions::new(TEMP_FOLDER)).await?;
            log::info!(
                "Remix source parked at {} ({} is not reclaimed)",
                stored.secure_url,
                stored.public_id
            );
            self.source = RemixSource::Url(stored.secure_url);
        }
        Ok(())
    }

    async fn invoke(&self, client: &dyn GenerationService) -> Result<Option<String>> {
        let image_url = match &self.source {
            RemixSource::Url(url) => url,
            RemixSource::File(_) => {
                return Err(RelayError::StoreError(
                    "Remix source file was not uploaded".into(),
                ))
            }
        };

        let images = client
            .remix(image_url, &self.prompt, &self.aspect_ratio)
            .await?;
        Ok(images.first_url())
    }
}
