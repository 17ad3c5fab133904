//! In-process stand-ins for the external services, shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    error::{RelayError, Result},
    fetch::ImageFetcher,
    ideogram::GenerationService,
    models::{
        storage::TEMP_FOLDER, GeneratedImage, GeneratedImages, ReframedImage, StoredMedia,
        UploadOptions,
    },
    pipeline::Pipeline,
    storage::MediaStore,
};

pub const ORIGINAL_URL: &str = "https://ideogram.ai/api/images/ephemeral/fox.png";
pub const STORED_URL: &str = "https://cdn/x.png";
pub const TEMP_URL: &str = "https://cdn/temp/source.png";

pub enum Reply {
    Images(Vec<String>),
    Fail(String),
}

pub struct StubGenerator {
    reply: Reply,
    pub calls: AtomicUsize,
    pub last_image_url: Mutex<Option<String>>,
}

impl StubGenerator {
    pub fn returning(urls: &[&str]) -> Self {
        Self::with_reply(Reply::Images(urls.iter().map(|u| u.to_string()).collect()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_image_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn images(&self) -> Result<Vec<GeneratedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Images(urls) => Ok(urls
                .iter()
                .map(|url| GeneratedImage {
                    url: Some(url.clone()),
                    prompt: None,
                    resolution: None,
                    seed: None,
                    is_image_safe: Some(true),
                })
                .collect()),
            Reply::Fail(message) => Err(RelayError::UpstreamError(message.clone())),
        }
    }
}

#[async_trait]
impl GenerationService for StubGenerator {
    async fn generate(&self, _prompt: &str, _aspect_ratio: &str) -> Result<GeneratedImages> {
        Ok(GeneratedImages {
            data: self.images()?,
        })
    }

    async fn reframe(&self, image_url: &str, _aspect_ratio: &str) -> Result<ReframedImage> {
        *self.last_image_url.lock().unwrap() = Some(image_url.to_string());
        Ok(ReframedImage {
            image: self.images()?.into_iter().next(),
        })
    }

    async fn remix(
        &self,
        image_url: &str,
        _prompt: &str,
        _aspect_ratio: &str,
    ) -> Result<GeneratedImages> {
        *self.last_image_url.lock().unwrap() = Some(image_url.to_string());
        Ok(GeneratedImages {
            data: self.images()?,
        })
    }
}

pub struct StubFetcher {
    reply: std::result::Result<Vec<u8>, String>,
    pub calls: AtomicUsize,
    pub last_url: Mutex<Option<String>>,
}

impl StubFetcher {
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            reply: Ok(bytes),
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        self.reply
            .clone()
            .map_err(RelayError::FetchError)
    }
}

#[derive(Default)]
pub struct StubStore {
    fail: Option<String>,
    pub uploads: Mutex<Vec<(UploadOptions, Vec<u8>)>>,
}

impl StubStore {
    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_string()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn folders(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(options, _)| options.folder.clone())
            .collect()
    }
}

#[async_trait]
impl MediaStore for StubStore {
    async fn upload(&self, data: Vec<u8>, options: UploadOptions) -> Result<StoredMedia> {
        let folder = options.folder.clone();
        self.uploads.lock().unwrap().push((options, data));

        if let Some(message) = &self.fail {
            return Err(RelayError::StoreError(message.clone()));
        }

        let secure_url = if folder == TEMP_FOLDER {
            TEMP_URL
        } else {
            STORED_URL
        };
        Ok(StoredMedia {
            secure_url: secure_url.to_string(),
            public_id: format!("{}/x", folder),
        })
    }
}

pub struct Harness {
    pub generator: Arc<StubGenerator>,
    pub fetcher: Arc<StubFetcher>,
    pub store: Arc<StubStore>,
}

impl Harness {
    pub fn new(generator: StubGenerator, fetcher: StubFetcher, store: StubStore) -> Self {
        Self {
            generator: Arc::new(generator),
            fetcher: Arc::new(fetcher),
            store: Arc::new(store),
        }
    }

    /// Stubs that succeed end to end with a small valid JPEG.
    pub fn happy() -> Self {
        Self::new(
            StubGenerator::returning(&[ORIGINAL_URL]),
            StubFetcher::returning(crate::transcode::tests::encoded(image::ImageFormat::Jpeg)),
            StubStore::default(),
        )
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.generator.clone(),
            self.fetcher.clone(),
            self.store.clone(),
        )
    }

    pub fn untouched(&self) -> bool {
        self.generator.calls() == 0 && self.fetcher.calls() == 0 && self.store.calls() == 0
    }
}
