pub mod image_client;

use crate::{
    error::Result,
    models::{GeneratedImages, ReframedImage},
};
use async_trait::async_trait;

pub use image_client::IdeogramClient;

/// The three calls the relay makes against the generation service. Each is a
/// single request with no retry.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str, aspect_ratio: &str) -> Result<GeneratedImages>;

    async fn reframe(&self, image_url: &str, aspect_ratio: &str) -> Result<ReframedImage>;

    async fn remix(
        &self,
        image_url: &str,
        prompt: &str,
        aspect_ratio: &str,
    ) -> Result<GeneratedImages>;
}
