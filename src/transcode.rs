use std::io::Cursor;

use image::ImageFormat;

use crate::error::{RelayError, Result};

/// Re-encodes arbitrary image bytes into one fixed raster format. Pixels are
/// left untouched.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    target: ImageFormat,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self {
            target: ImageFormat::Png,
        }
    }
}

impl Transcoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extension-style tag for the target format, e.g. `"png"`.
    pub fn format_tag(&self) -> &'static str {
        self.target.extensions_str().first().copied().unwrap_or("png")
    }

    pub fn transcode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RelayError::TranscodeError(format!("Failed to decode image: {}", e)))?;

        let mut output = Cursor::new(Vec::with_capacity(bytes.len()));
        decoded
            .write_to(&mut output, self.target)
            .map_err(|e| RelayError::TranscodeError(format!("Failed to encode image: {}", e)))?;

        log::debug!(
            "Transcoded {} bytes into {} bytes of {}",
            bytes.len(),
            output.get_ref().len(),
            self.format_tag()
        );

        Ok(output.into_inner())
    }
}
