use serde::{Deserialize, Serialize};

pub const GENERATE_FOLDER: &str = "ideogram-images";
pub const REFRAME_FOLDER: &str = "ideogram-reframed";
pub const REMIX_FOLDER: &str = "ideogram-remixed";
pub const TEMP_FOLDER: &str = "temp";

/// Per-call placement for an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub format: Option<String>,
}

impl UploadOptions {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// What the media store hands back after accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub secure_url: String,
    pub public_id: String,
}
