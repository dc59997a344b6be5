//! Core types for image editing.

use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }

    /// Detects the format of an upload, assuming PNG when unrecognized.
    pub fn detect_or_png(data: &[u8]) -> Self {
        Self::from_magic_bytes(data).unwrap_or_default()
    }
}

/// Image provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    /// Azure OpenAI image deployments (gpt-image-1).
    Azure,
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Azure => write!(f, "azure"),
        }
    }
}

/// Metadata about the edit call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMetadata {
    /// Deployment that served the request.
    pub deployment: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Output size requested (e.g., "1024x1024").
    pub size: Option<String>,
}

/// A request to edit one or more source images.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// The text prompt describing the desired change.
    pub prompt: String,
    /// Source images, in the order they are sent.
    pub images: Vec<Vec<u8>>,
    /// Optional mask; transparent pixels mark the editable region.
    pub mask: Option<Vec<u8>>,
}

impl EditRequest {
    /// Creates a request editing a single image.
    pub fn new(prompt: impl Into<String>, image: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            images: vec![image],
            mask: None,
        }
    }

    /// Creates a request over several source images.
    pub fn with_images(prompt: impl Into<String>, images: Vec<Vec<u8>>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
            mask: None,
        }
    }

    /// Creates a request from base64-encoded images and mask.
    pub fn from_base64<S: AsRef<str>>(
        prompt: impl Into<String>,
        images: &[S],
        mask: Option<&str>,
    ) -> Result<Self> {
        let images = images
            .iter()
            .map(|img| decode_base64(img.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let mask = mask.map(decode_base64).transpose()?;

        Ok(Self {
            prompt: prompt.into(),
            images,
            mask,
        })
    }

    /// Appends another source image.
    pub fn add_image(mut self, image: Vec<u8>) -> Self {
        self.images.push(image);
        self
    }

    /// Sets the mask.
    pub fn with_mask(mut self, mask: Vec<u8>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Checks the invariants the service cannot report cheaply.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(MediaError::InvalidRequest("prompt is empty".into()));
        }
        if self.images.is_empty() {
            return Err(MediaError::InvalidRequest(
                "at least one source image is required".into(),
            ));
        }
        if let Some(i) = self.images.iter().position(|img| img.is_empty()) {
            return Err(MediaError::InvalidRequest(format!("image {i} is empty")));
        }
        if matches!(self.mask.as_deref(), Some([])) {
            return Err(MediaError::InvalidRequest("mask is empty".into()));
        }
        Ok(())
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| MediaError::Decode(e.to_string()))
}

/// The persisted output of a successful edit.
#[derive(Debug, Clone)]
#[must_use = "the edit result names the file that was written"]
pub struct EditResult {
    /// File name inside the output directory (`{uuid}.png`).
    pub filename: String,
    /// Full path of the written file.
    pub path: PathBuf,
    /// Provider that served the edit.
    pub provider: ImageProviderKind,
    /// Call metadata.
    pub metadata: EditMetadata,
}
