//! Relay that turns image requests into stored PNGs: the request goes to a
//! generation service, the resulting image is downloaded, re-encoded and
//! uploaded to a media store, and both URLs are returned to the caller.

pub mod config;
pub mod error;
pub mod fetch;
pub mod ideogram;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod transcode;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CloudinaryConfig, Config, IdeogramConfig, SignatureAlgorithm};
pub use error::{RelayError, Result};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use ideogram::{GenerationService, IdeogramClient};
pub use models::{
    GenerationRequest, OperationResult, ReframeRequest, RemixRequest, StoredMedia, UploadOptions,
};
pub use pipeline::Pipeline;
pub use storage::{CloudinaryStore, MediaStore};
pub use transcode::Transcoder;
