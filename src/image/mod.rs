//! Image editing module.

mod azure;
mod provider;
mod types;

pub use azure::{AzureImageEditor, AzureImageEditorBuilder};
pub use provider::ImageEditProvider;
pub use types::{EditMetadata, EditRequest, EditResult, ImageFormat, ImageProviderKind};
