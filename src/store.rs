//! Local artifact persistence.

use crate::error::{MediaError, Result};
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes generated artifacts into a single output directory.
///
/// The directory is created once by [`ArtifactStore::open`]. Writing a name
/// that already exists truncates and replaces the file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Opens the store, creating `dir` (and parents) if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns where `filename` would be written.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let valid = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\']);
        if !valid {
            return Err(MediaError::InvalidRequest(format!(
                "invalid artifact filename: {filename:?}"
            )));
        }
        Ok(self.dir.join(filename))
    }

    /// Decodes a base64 payload and writes it.
    pub async fn write_base64(&self, filename: &str, payload: &str) -> Result<PathBuf> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| MediaError::Decode(e.to_string()))?;
        self.write_bytes(filename, &bytes).await
    }

    /// Writes raw bytes.
    pub async fn write_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(path)
    }

    /// Drains a byte stream into the file, chunk by chunk.
    ///
    /// Chunks land in `{filename}.part`, which is renamed into place after the
    /// last chunk is flushed. If the stream or a write fails the partial file
    /// is removed and no artifact is left behind.
    pub async fn write_stream<S, B, E>(&self, filename: &str, stream: S) -> Result<PathBuf>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<MediaError>,
    {
        let path = self.path_for(filename)?;
        let partial = self.path_for(&format!("{filename}.part"))?;

        let written = match drain_into(&partial, stream).await {
            Ok(written) => written,
            Err(e) => {
                tokio::fs::remove_file(&partial).await.ok();
                tracing::warn!(path = %path.display(), error = %e, "artifact write aborted");
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            tokio::fs::remove_file(&partial).await.ok();
            return Err(e.into());
        }

        tracing::info!(path = %path.display(), bytes = written, "artifact written");
        Ok(path)
    }
}

async fn drain_into<S, B, E>(path: &Path, stream: S) -> Result<usize>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<MediaError>,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = std::pin::pin!(stream);
    let mut written = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        file.write_all(chunk.as_ref()).await?;
        written += chunk.as_ref().len();
    }
    file.flush().await?;
    Ok(written)
}
