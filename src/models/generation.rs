use serde::{Deserialize, Serialize};

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

fn aspect_ratio_or_default(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(ratio) if !ratio.is_empty() => ratio.to_string(),
        _ => DEFAULT_ASPECT_RATIO.to_string(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn prompt(&self) -> Option<&str> {
        non_blank(&self.prompt)
    }

    pub fn aspect_ratio(&self) -> String {
        aspect_ratio_or_default(&self.aspect_ratio)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReframeRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

impl ReframeRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn image_url(&self) -> Option<&str> {
        non_blank(&self.image_url)
    }

    pub fn aspect_ratio(&self) -> String {
        aspect_ratio_or_default(&self.aspect_ratio)
    }
}

/// Remix takes its source either as an uploaded file or as a URL. When both
/// arrive the file wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemixRequest {
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

impl RemixRequest {
    pub fn from_url(image_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image: None,
            image_url: Some(image_url.into()),
            prompt: Some(prompt.into()),
            aspect_ratio: None,
        }
    }

    pub fn from_file(image: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            image_url: None,
            prompt: Some(prompt.into()),
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn has_file(&self) -> bool {
        self.image.as_ref().map_or(false, |bytes| !bytes.is_empty())
    }

    pub fn image_url(&self) -> Option<&str> {
        non_blank(&self.image_url)
    }

    pub fn prompt(&self) -> Option<&str> {
        non_blank(&self.prompt)
    }

    pub fn aspect_ratio(&self) -> String {
        aspect_ratio_or_default(&self.aspect_ratio)
    }
}

// Wire types for the generation service.

#[derive(Debug, Clone, Serialize)]
pub struct GenerateBody<'a> {
    pub prompt: &'a str,
    pub aspect_ratio: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReframeBody<'a> {
    pub image_url: &'a str,
    pub aspect_ratio: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemixBody<'a> {
    pub image_url: &'a str,
    pub prompt: &'a str,
    pub aspect_ratio: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub is_image_safe: Option<bool>,
}

/// Response of the generate and remix calls: a list of images.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedImages {
    #[serde(default)]
    pub data: Vec<GeneratedImage>,
}

impl GeneratedImages {
    pub fn first_url(self) -> Option<String> {
        self.data.into_iter().next().and_then(|image| image.url)
    }
}

/// Response of the reframe call: at most one image reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReframedImage {
    #[serde(default)]
    pub image: Option<GeneratedImage>,
}

impl ReframedImage {
    pub fn url(self) -> Option<String> {
        self.image.and_then(|image| image.url)
    }
}
