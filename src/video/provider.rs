//! Video provider trait.

use crate::error::Result;
use crate::video::types::{VideoArtifact, VideoGenerationRequest, VideoProviderKind};
use async_trait::async_trait;

/// Trait for video generation providers.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Generates a video and writes it to the artifact store.
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<VideoArtifact>;

    /// Returns the kind of this provider.
    fn kind(&self) -> VideoProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            VideoProviderKind::Sora => "Sora (Azure OpenAI)",
        }
    }

    /// Checks that the provider is configured well enough to make calls.
    async fn health_check(&self) -> Result<()>;
}
