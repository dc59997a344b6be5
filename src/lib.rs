#![warn(missing_docs)]
//! Bibble - image editing and video generation on Azure OpenAI.
//!
//! Two independent clients share one configuration type and one artifact
//! store: [`AzureImageEditor`] sends multipart edit requests to a
//! `gpt-image-1` deployment, and [`SoraProvider`] submits Sora video jobs,
//! polls them to completion and downloads the result.
//!
//! # Quick Start - Image edits
//!
//! ```no_run
//! use bibble::{AzureImageEditor, EditRequest, ImageEditProvider, MediaConfig};
//!
//! #[tokio::main]
//! async fn main() -> bibble::Result<()> {
//!     let config = MediaConfig::from_env();
//!     let editor = AzureImageEditor::builder().config(&config).build()?;
//!     let request = EditRequest::new("Add a party hat", std::fs::read("cat.png")?);
//!     let result = editor.edit(&request).await?;
//!     println!("wrote {}", result.path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Videos
//!
//! ```no_run
//! use bibble::{MediaConfig, SoraProvider, VideoGenerationRequest, VideoProvider};
//!
//! #[tokio::main]
//! async fn main() -> bibble::Result<()> {
//!     let config = MediaConfig::from_env();
//!     let provider = SoraProvider::builder().config(&config).build()?;
//!     let request = VideoGenerationRequest::new("A peaceful lake at dawn").with_duration(10);
//!     let video = provider.generate(&request).await?;
//!     println!("wrote {}", video.path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `image`: Azure OpenAI image edits (gpt-image-1)
//! - `video`: Sora video generation jobs
//!
//! Both are enabled by default.

pub mod config;
mod error;
pub mod store;

#[cfg(feature = "image")]
pub mod image;

#[cfg(feature = "video")]
pub mod video;

// Re-export error types at crate root
pub use error::{MediaError, Result};

pub use config::{MediaConfig, ServiceCredentials};
pub use store::ArtifactStore;

#[cfg(feature = "image")]
pub use image::{
    AzureImageEditor, AzureImageEditorBuilder, EditMetadata, EditRequest, EditResult,
    ImageEditProvider, ImageFormat, ImageProviderKind,
};

#[cfg(feature = "video")]
pub use video::{
    Generation, JobStatus, SoraProvider, SoraProviderBuilder, VideoArtifact,
    VideoGenerationRequest, VideoJob, VideoMetadata, VideoProvider, VideoProviderKind,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::MediaConfig;
    pub use crate::error::{MediaError, Result};
    pub use crate::store::ArtifactStore;

    #[cfg(feature = "image")]
    pub use crate::image::{AzureImageEditor, EditRequest, EditResult, ImageEditProvider};

    #[cfg(feature = "video")]
    pub use crate::video::{
        SoraProvider, VideoArtifact, VideoGenerationRequest, VideoProvider,
    };
}
