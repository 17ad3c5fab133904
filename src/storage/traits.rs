use crate::{
    error::Result,
    models::storage::{StoredMedia, UploadOptions},
};
use async_trait::async_trait;

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads `data` and returns its durable location. Nothing is read back.
    async fn upload(&self, data: Vec<u8>, options: UploadOptions) -> Result<StoredMedia>;
}
