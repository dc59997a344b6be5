//! Sora video generation provider on Azure OpenAI.

use crate::config::{MediaConfig, ServiceCredentials};
use crate::error::{MediaError, Result};
use crate::store::ArtifactStore;
use crate::video::provider::VideoProvider;
use crate::video::types::{
    Generation, JobStatus, VideoArtifact, VideoGenerationRequest, VideoJob, VideoMetadata,
    VideoProviderKind,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_API_VERSION: &str = "preview";
const DEFAULT_MODEL: &str = "sora";

/// Builder for SoraProvider.
#[derive(Debug, Clone)]
pub struct SoraProviderBuilder {
    credentials: Option<ServiceCredentials>,
    output_dir: Option<PathBuf>,
    model: String,
    api_version: String,
    poll_interval: Duration,
    timeout: Option<Duration>,
    max_polls: Option<u32>,
}

impl Default for SoraProviderBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            output_dir: None,
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: Duration::from_secs(5),
            timeout: None,
            max_polls: None,
        }
    }
}

impl SoraProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the Sora resource and output directory from `config`.
    pub fn config(mut self, config: &MediaConfig) -> Self {
        self.credentials = Some(config.video.clone());
        self.output_dir = Some(config.output_dir.clone());
        self
    }

    /// Sets the resource endpoint and API key.
    pub fn credentials(mut self, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.credentials = Some(ServiceCredentials::new(endpoint, api_key));
        self
    }

    /// Sets the directory videos are written to.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the model name sent with each job (default: `sora`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the `api-version` query parameter.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the delay before each status poll.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for a terminal status.
    ///
    /// Without a timeout or [`max_polls`](Self::max_polls), polling continues
    /// until the service reports a terminal status.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of status polls.
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Builds the provider, validating credentials and opening the store.
    pub fn build(self) -> Result<SoraProvider> {
        let credentials = self.credentials.ok_or_else(|| {
            MediaError::Config("video endpoint and API key were not provided".into())
        })?;
        credentials.validate("video")?;

        let store = ArtifactStore::open(
            self.output_dir
                .unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_OUTPUT_DIR)),
        )?;

        Ok(SoraProvider {
            client: reqwest::Client::new(),
            credentials,
            store,
            model: self.model,
            api_version: self.api_version,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            max_polls: self.max_polls,
        })
    }
}

/// Sora video generation provider.
pub struct SoraProvider {
    client: reqwest::Client,
    credentials: ServiceCredentials,
    store: ArtifactStore,
    model: String,
    api_version: String,
    poll_interval: Duration,
    timeout: Option<Duration>,
    max_polls: Option<u32>,
}

impl SoraProvider {
    /// Creates a new `SoraProviderBuilder`.
    pub fn builder() -> SoraProviderBuilder {
        SoraProviderBuilder::new()
    }

    /// Generates a video of `duration_secs` seconds at the default resolution.
    pub async fn generate_video(
        &self,
        prompt: impl Into<String>,
        duration_secs: u32,
    ) -> Result<VideoArtifact> {
        let request = VideoGenerationRequest::new(prompt).with_duration(duration_secs);
        self.generate(&request).await
    }

    fn jobs_url(&self) -> String {
        format!("{}/openai/v1/video/generations/jobs", self.credentials.endpoint)
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.jobs_url(), job_id)
    }

    fn content_url(&self, generation_id: &str) -> String {
        format!(
            "{}/openai/v1/video/generations/{}/content/video",
            self.credentials.endpoint, generation_id
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(&self.credentials.api_key)
    }

    /// Submits a job. The returned job is in the local `started` state.
    pub async fn submit(&self, request: &VideoGenerationRequest) -> Result<VideoJob> {
        let body = SoraJobRequest::from_request(request, &self.model);

        let response = self
            .client
            .post(self.jobs_url())
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(&self.credentials.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(MediaError::from_response(status.as_u16(), text));
        }

        let submitted: SoraSubmitResponse = response.json().await?;
        tracing::debug!(job_id = %submitted.id, "submitted Sora video job");
        Ok(VideoJob::submitted(submitted.id, request))
    }

    /// Polls until the job reaches a terminal status. Returns the poll count.
    ///
    /// Each poll is preceded by one `poll_interval` sleep. The job's status and
    /// generation list are overwritten with every successful read. With a
    /// timeout set, the last sleep is shortened to the deadline and a poll in
    /// flight at the deadline is abandoned.
    pub async fn wait_for_completion(&self, job: &mut VideoJob) -> Result<u32> {
        let url = self.job_url(&job.id);
        let start = Instant::now();
        let deadline = self.timeout.map(|timeout| (start + timeout, timeout));
        let mut polls = 0u32;

        while !job.status.is_terminal() {
            if self.max_polls.is_some_and(|max| polls >= max) {
                return Err(MediaError::Timeout(start.elapsed()));
            }

            let nap = match deadline {
                Some((at, timeout)) => self.poll_interval.min(remaining(at, timeout)?),
                None => self.poll_interval,
            };
            tokio::time::sleep(nap).await;

            let poll = match deadline {
                Some((at, timeout)) => {
                    tokio::time::timeout(remaining(at, timeout)?, self.poll(&url))
                        .await
                        .map_err(|_| MediaError::Timeout(timeout))??
                }
                None => self.poll(&url).await?,
            };
            polls += 1;

            let reported = JobStatus::from(poll.status);
            if reported != job.status {
                tracing::info!(job_id = %job.id, status = %reported, "video job status changed");
            }
            tracing::debug!(
                job_id = %job.id,
                status = %reported,
                polls,
                elapsed_secs = start.elapsed().as_secs(),
                "polled Sora video job"
            );

            if let Some(reason) = poll.failure_reason.as_deref() {
                tracing::warn!(job_id = %job.id, reason, "video job reported a failure reason");
            }

            job.status = reported;
            job.generations = poll.generations;
        }

        Ok(polls)
    }

    async fn poll(&self, url: &str) -> Result<SoraPollResponse> {
        let response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(MediaError::from_response(status.as_u16(), text));
        }
        Ok(response.json().await?)
    }

    /// Downloads the first generation of a succeeded job as `{job_id}.mp4`.
    pub async fn download(&self, job: &VideoJob) -> Result<(Generation, PathBuf)> {
        match &job.status {
            JobStatus::Succeeded => {}
            status if status.is_terminal() => {
                return Err(MediaError::JobTerminated {
                    job_id: job.id.clone(),
                    status: status.to_string(),
                });
            }
            status => {
                return Err(MediaError::InvalidRequest(format!(
                    "job {} has not finished (status: {status})",
                    job.id
                )));
            }
        }

        let generation = job.generations.first().cloned().ok_or_else(|| {
            MediaError::EmptyResult(format!("job {} succeeded without generations", job.id))
        })?;

        let response = self.get(&self.content_url(&generation.id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(MediaError::from_response(status.as_u16(), text));
        }

        let path = self
            .store
            .write_stream(&format!("{}.mp4", job.id), response.bytes_stream())
            .await?;
        Ok((generation, path))
    }
}

/// Time left before `at`, or `Timeout` once it has passed.
fn remaining(at: Instant, timeout: Duration) -> Result<Duration> {
    let left = at.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(MediaError::Timeout(timeout));
    }
    Ok(left)
}

#[async_trait]
impl VideoProvider for SoraProvider {
    async fn generate(&self, request: &VideoGenerationRequest) -> Result<VideoArtifact> {
        let start = Instant::now();

        let mut job = self.submit(request).await?;
        let polls = self.wait_for_completion(&mut job).await?;

        if matches!(job.status, JobStatus::Failed | JobStatus::Cancelled) {
            tracing::warn!(job_id = %job.id, status = %job.status, "video job did not succeed");
        }
        let (generation, path) = self.download(&job).await?;

        Ok(VideoArtifact {
            job_id: job.id,
            generation_id: generation.id,
            path,
            provider: VideoProviderKind::Sora,
            metadata: VideoMetadata {
                model: Some(self.model.clone()),
                duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
                polls,
                video_duration_secs: Some(request.duration_secs),
                resolution: Some(format!("{}x{}", request.width, request.height)),
            },
        })
    }

    fn kind(&self) -> VideoProviderKind {
        VideoProviderKind::Sora
    }

    async fn health_check(&self) -> Result<()> {
        self.credentials.validate("video")
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct SoraJobRequest {
    prompt: String,
    width: u32,
    height: u32,
    n_seconds: u32,
    n_variants: u32,
    model: String,
}

impl SoraJobRequest {
    fn from_request(req: &VideoGenerationRequest, model: &str) -> Self {
        Self {
            prompt: req.prompt.clone(),
            width: req.width,
            height: req.height,
            n_seconds: req.duration_secs,
            n_variants: req.variants,
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SoraSubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SoraPollResponse {
    status: String,
    #[serde(default)]
    generations: Vec<Generation>,
    #[serde(default)]
    failure_reason: Option<String>,
}
