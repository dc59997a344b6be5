//! Core types for video generation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Video provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProviderKind {
    /// Sora on Azure OpenAI.
    Sora,
}

impl std::fmt::Display for VideoProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sora => write!(f, "sora"),
        }
    }
}

/// Status of a video generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Assigned locally when the job is submitted, before the first poll.
    Started,
    /// Finished; generations can be downloaded.
    Succeeded,
    /// The service gave up on the job.
    Failed,
    /// The job was cancelled before finishing.
    Cancelled,
    /// Any other status the service reports (queued, preprocessing, running, ...).
    Other(String),
}

impl JobStatus {
    /// Returns true once no further polling should happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "started" => Self::Started,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to generate a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGenerationRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Video duration in seconds.
    pub duration_secs: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of variants the job should produce. Only the first is downloaded.
    pub variants: u32,
}

impl VideoGenerationRequest {
    /// Default duration when none is given.
    pub const DEFAULT_DURATION_SECS: u32 = 10;

    /// Creates a 10 second 1920x1080 request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration_secs: Self::DEFAULT_DURATION_SECS,
            width: 1920,
            height: 1080,
            variants: 1,
        }
    }

    /// Sets the video duration in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Sets the resolution.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the number of variants.
    pub fn with_variants(mut self, variants: u32) -> Self {
        self.variants = variants;
        self
    }
}

/// One output of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Opaque generation id used by the content endpoint.
    pub id: String,
}

/// A submitted video job and what the service last reported about it.
#[derive(Debug, Clone)]
pub struct VideoJob {
    /// Job id assigned by the service.
    pub id: String,
    /// Prompt the job was submitted with.
    pub prompt: String,
    /// Requested frame width.
    pub width: u32,
    /// Requested frame height.
    pub height: u32,
    /// Requested duration in seconds.
    pub duration_secs: u32,
    /// Requested number of variants.
    pub variant_count: u32,
    /// Last known status.
    pub status: JobStatus,
    /// Filled in once the job succeeds.
    pub generations: Vec<Generation>,
}

impl VideoJob {
    pub(crate) fn submitted(id: String, request: &VideoGenerationRequest) -> Self {
        Self {
            id,
            prompt: request.prompt.clone(),
            width: request.width,
            height: request.height,
            duration_secs: request.duration_secs,
            variant_count: request.variants,
            status: JobStatus::Started,
            generations: Vec::new(),
        }
    }
}

/// Metadata about the video generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Wall time from submission to download, in milliseconds.
    pub duration_ms: Option<u64>,
    /// Number of status polls performed.
    pub polls: u32,
    /// Video duration in seconds.
    pub video_duration_secs: Option<u32>,
    /// Video resolution (e.g., "1920x1080").
    pub resolution: Option<String>,
}

/// A downloaded video written to the artifact store.
#[derive(Debug, Clone)]
#[must_use = "the artifact names the file that was written"]
pub struct VideoArtifact {
    /// Job that produced the video.
    pub job_id: String,
    /// Generation that was downloaded.
    pub generation_id: String,
    /// Full path of the written `{job_id}.mp4`.
    pub path: PathBuf,
    /// Provider that generated this video.
    pub provider: VideoProviderKind,
    /// Generation metadata.
    pub metadata: VideoMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(JobStatus::from("succeeded"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::from("cancelled"), JobStatus::Cancelled);
        assert_eq!(
            JobStatus::from("running"),
            JobStatus::Other("running".into())
        );
    }

    #[test]
    fn test_status_terminal() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Started.is_terminal());
        assert!(!JobStatus::Other("queued".into()).is_terminal());
    }

    #[test]
    fn test_status_display_round_trips_unknown() {
        assert_eq!(JobStatus::from("preprocessing").to_string(), "preprocessing");
        assert_eq!(JobStatus::Started.to_string(), "started");
    }

    #[test]
    fn test_request_defaults() {
        let req = VideoGenerationRequest::new("A peaceful lake");
        assert_eq!(req.duration_secs, 10);
        assert_eq!((req.width, req.height), (1920, 1080));
        assert_eq!(req.variants, 1);

        let req = req.with_duration(5).with_size(1080, 1080);
        assert_eq!(req.duration_secs, 5);
        assert_eq!((req.width, req.height), (1080, 1080));
    }

    #[test]
    fn test_job_starts_locally() {
        let req = VideoGenerationRequest::new("A peaceful lake").with_variants(2);
        let job = VideoJob::submitted("task_1".into(), &req);
        assert_eq!(job.status, JobStatus::Started);
        assert_eq!(job.variant_count, 2);
        assert!(job.generations.is_empty());
    }
}
