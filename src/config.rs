//! Service configuration.
//!
//! Endpoints and keys are read once into a [`MediaConfig`] and handed to the
//! client builders. Unset variables resolve to [`UNSET`] so a half-configured
//! environment still loads; each client validates its own credentials when
//! it is built.

use crate::error::{MediaError, Result};
use std::path::PathBuf;

/// Placeholder used for any endpoint or key that is not set.
pub const UNSET: &str = "EMPTY";

/// Default directory for generated artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Image resource endpoint variable.
pub const IMAGE_ENDPOINT_VAR: &str = "AZURE_IMAGE_ENDPOINT";
/// Image resource key variable.
pub const IMAGE_API_KEY_VAR: &str = "AZURE_IMAGE_API_KEY";
/// Sora resource endpoint variable.
pub const SORA_ENDPOINT_VAR: &str = "AZURE_SORA_ENDPOINT";
/// Sora resource key variable.
pub const SORA_API_KEY_VAR: &str = "AZURE_SORA_API_KEY";
/// Artifact directory variable.
pub const OUTPUT_DIR_VAR: &str = "BIBBLE_OUTPUT_DIR";

/// Endpoint and key for one Azure OpenAI resource.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredentials {
    /// Base endpoint without a trailing slash.
    pub endpoint: String,
    /// Key sent with every request.
    pub api_key: String,
}

impl ServiceCredentials {
    /// Creates credentials, stripping any trailing `/` from the endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn unset() -> Self {
        Self::new(UNSET, UNSET)
    }

    /// Fails if the endpoint or key is blank or still the [`UNSET`] marker.
    pub fn validate(&self, service: &str) -> Result<()> {
        if is_unset(&self.endpoint) {
            return Err(MediaError::Config(format!("{service} endpoint is not set")));
        }
        if is_unset(&self.api_key) {
            return Err(MediaError::Config(format!("{service} API key is not set")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == UNSET
}

/// Configuration for both clients.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Image edits resource (`AZURE_IMAGE_*`).
    pub image: ServiceCredentials,
    /// Sora video resource (`AZURE_SORA_*`).
    pub video: ServiceCredentials,
    /// Where artifacts are written.
    pub output_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image: ServiceCredentials::unset(),
            video: ServiceCredentials::unset(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl MediaConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_else(|| UNSET.to_string());

        Self {
            image: ServiceCredentials::new(get(IMAGE_ENDPOINT_VAR), get(IMAGE_API_KEY_VAR)),
            video: ServiceCredentials::new(get(SORA_ENDPOINT_VAR), get(SORA_API_KEY_VAR)),
            output_dir: lookup(OUTPUT_DIR_VAR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Sets the image edits resource.
    pub fn with_image(mut self, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.image = ServiceCredentials::new(endpoint, api_key);
        self
    }

    /// Sets the Sora video resource.
    pub fn with_video(mut self, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.video = ServiceCredentials::new(endpoint, api_key);
        self
    }

    /// Sets the artifact directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
