//! Image edit provider trait.

use crate::error::Result;
use crate::image::types::{EditRequest, EditResult, ImageProviderKind};
use async_trait::async_trait;

/// Trait for image editing providers.
#[async_trait]
pub trait ImageEditProvider: Send + Sync {
    /// Sends one edit request and persists the returned image.
    async fn edit(&self, request: &EditRequest) -> Result<EditResult>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ImageProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ImageProviderKind::Azure => "Azure OpenAI (gpt-image-1)",
        }
    }

    /// Checks that the provider is configured well enough to make calls.
    async fn health_check(&self) -> Result<()>;
}
