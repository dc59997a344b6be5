//! Azure OpenAI image edit provider (gpt-image-1 deployments).

use crate::config::{MediaConfig, ServiceCredentials};
use crate::error::{MediaError, Result};
use crate::image::provider::ImageEditProvider;
use crate::image::types::{EditMetadata, EditRequest, EditResult, ImageFormat, ImageProviderKind};
use crate::store::ArtifactStore;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;

const DEFAULT_DEPLOYMENT: &str = "gpt-image-1";
const DEFAULT_API_VERSION: &str = "2025-04-01-preview";
const DEFAULT_SIZE: &str = "1024x1024";
const DEFAULT_QUALITY: &str = "high";

/// Builder for AzureImageEditor.
#[derive(Debug, Clone)]
pub struct AzureImageEditorBuilder {
    credentials: Option<ServiceCredentials>,
    output_dir: Option<PathBuf>,
    deployment: String,
    api_version: String,
    size: String,
    quality: String,
}

impl Default for AzureImageEditorBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            output_dir: None,
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            size: DEFAULT_SIZE.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
        }
    }
}

impl AzureImageEditorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the image resource and output directory from `config`.
    pub fn config(mut self, config: &MediaConfig) -> Self {
        self.credentials = Some(config.image.clone());
        self.output_dir = Some(config.output_dir.clone());
        self
    }

    /// Sets the resource endpoint and API key.
    pub fn credentials(mut self, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.credentials = Some(ServiceCredentials::new(endpoint, api_key));
        self
    }

    /// Sets the directory edited images are written to.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the deployment name (default: `gpt-image-1`).
    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    /// Sets the `api-version` query parameter.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the output size (default: `1024x1024`).
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Sets the quality: "low", "medium" or "high" (default).
    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Builds the editor, validating credentials and opening the store.
    pub fn build(self) -> Result<AzureImageEditor> {
        let credentials = self.credentials.ok_or_else(|| {
            MediaError::Config("image endpoint and API key were not provided".into())
        })?;
        credentials.validate("image")?;

        let store = ArtifactStore::open(
            self.output_dir
                .unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR)),
        )?;

        Ok(AzureImageEditor {
            client: reqwest::Client::new(),
            credentials,
            store,
            deployment: self.deployment,
            api_version: self.api_version,
            size: self.size,
            quality: self.quality,
        })
    }
}

/// Azure OpenAI image edit provider.
pub struct AzureImageEditor {
    client: reqwest::Client,
    credentials: ServiceCredentials,
    store: ArtifactStore,
    deployment: String,
    api_version: String,
    size: String,
    quality: String,
}

impl AzureImageEditor {
    /// Creates a new `AzureImageEditorBuilder`.
    pub fn builder() -> AzureImageEditorBuilder {
        AzureImageEditorBuilder::new()
    }

    /// Edits `images` (optionally under `mask`) and returns the written file.
    pub async fn edit_image(
        &self,
        prompt: impl Into<String>,
        images: Vec<Vec<u8>>,
        mask: Option<Vec<u8>>,
    ) -> Result<EditResult> {
        let request = EditRequest {
            prompt: prompt.into(),
            images,
            mask,
        };
        self.edit(&request).await
    }

    fn edits_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/images/edits",
            self.credentials.endpoint, self.deployment
        )
    }

    /// Assembles the multipart body: images, text fields, then the mask.
    fn build_form(&self, request: &EditRequest) -> Result<Form> {
        let count = request.images.len();
        let mut form = Form::new();

        for (index, image) in request.images.iter().enumerate() {
            let (field, stem) = image_field(index, count);
            form = form.part(field, image_part(image, stem)?);
        }

        form = form
            .part("prompt", text_part(&request.prompt)?)
            .part("size", text_part(&self.size)?)
            .part("quality", text_part(&self.quality)?);

        if let Some(mask) = &request.mask {
            let part = Part::bytes(mask.clone())
                .file_name("mask.png")
                .mime_str(ImageFormat::Png.mime_type())
                .map_err(|e| MediaError::InvalidRequest(e.to_string()))?;
            form = form.part("mask", part);
        }

        Ok(form)
    }
}

/// Field name and file stem for the image at `index` of `count`.
///
/// A lone image goes in `image`; several are sent as `image[0]`, `image[1]`, ...
fn image_field(index: usize, count: usize) -> (String, String) {
    if count == 1 {
        ("image".to_string(), "image".to_string())
    } else {
        (format!("image[{index}]"), format!("image_{index}"))
    }
}

fn image_part(data: &[u8], stem: String) -> Result<Part> {
    let format = ImageFormat::detect_or_png(data);
    Part::bytes(data.to_vec())
        .file_name(format!("{stem}.{}", format.extension()))
        .mime_str(format.mime_type())
        .map_err(|e| MediaError::InvalidRequest(e.to_string()))
}

fn text_part(value: &str) -> Result<Part> {
    Part::text(value.to_string())
        .mime_str("text/plain")
        .map_err(|e| MediaError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl ImageEditProvider for AzureImageEditor {
    async fn edit(&self, request: &EditRequest) -> Result<EditResult> {
        request.validate()?;
        let start = Instant::now();

        let form = self.build_form(request)?;
        tracing::debug!(
            deployment = %self.deployment,
            images = request.images.len(),
            masked = request.mask.is_some(),
            "submitting image edit"
        );

        let response = self
            .client
            .post(self.edits_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.credentials.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(MediaError::from_response(status.as_u16(), text));
        }

        let edit_response: EditResponse = response.json().await?;
        let b64 = edit_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| MediaError::EmptyResult("no image in edit response".into()))?;

        let filename = format!("{}.png", uuid::Uuid::new_v4());
        let path = self.store.write_base64(&filename, &b64).await?;

        Ok(EditResult {
            filename,
            path,
            provider: ImageProviderKind::Azure,
            metadata: EditMetadata {
                deployment: Some(self.deployment.clone()),
                duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
                size: Some(self.size.clone()),
            },
        })
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Azure
    }

    async fn health_check(&self) -> Result<()> {
        self.credentials.validate("image")
    }
}

#[derive(Debug, Deserialize)]
struct EditResponse {
    #[serde(default)]
    data: Vec<EditData>,
}

#[derive(Debug, Deserialize)]
struct EditData {
    #[serde(default)]
    b64_json: Option<String>,
}
