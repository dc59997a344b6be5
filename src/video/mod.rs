//! Video generation module.

mod provider;
mod sora;
mod types;

pub use provider::VideoProvider;
pub use sora::{SoraProvider, SoraProviderBuilder};
pub use types::{
    Generation, JobStatus, VideoArtifact, VideoGenerationRequest, VideoJob, VideoMetadata,
    VideoProviderKind,
};
