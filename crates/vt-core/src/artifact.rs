use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Front,
    Rear,
    Video,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
            Self::Video => "video",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }

    /// File name for a freshly generated artifact id.
    pub fn file_name(&self, id: Uuid) -> String {
        match self {
            Self::Video => format!("{}.mp4", id),
            image => format!("{}_{}.jpeg", id, image.as_str()),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persists generated results locally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create the result directories. Safe to call repeatedly.
    async fn prepare(&self) -> Result<()>;

    async fn store(&self, url: &str, kind: ArtifactKind) -> Result<PathBuf>;
}

/// Downloads result URLs into `<result_dir>/{images,videos}`.
#[derive(Clone)]
pub struct ArtifactFetcher {
    transport: Arc<dyn Transport>,
    storage: StorageConfig,
}

impl ArtifactFetcher {
    pub fn new(transport: Arc<dyn Transport>, storage: StorageConfig) -> Self {
        Self { transport, storage }
    }

    fn dir_for(&self, kind: ArtifactKind) -> PathBuf {
        if kind.is_video() {
            self.storage.videos_dir()
        } else {
            self.storage.images_dir()
        }
    }

    pub async fn fetch_and_store(&self, url: &str, kind: ArtifactKind) -> Result<PathBuf> {
        if url.trim().is_empty() {
            return Err(Error::NoUrl);
        }

        let reply = self
            .transport
            .download(url)
            .await
            .map_err(|e| Error::DownloadFailed {
                url: url.to_string(),
                status: None,
                message: e.to_string(),
            })?;

        if !reply.is_success() {
            return Err(Error::DownloadFailed {
                url: url.to_string(),
                status: Some(reply.status),
                message: reply.text(),
            });
        }

        let dir = self.dir_for(kind);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(kind.file_name(Uuid::new_v4()));
        tokio::fs::write(&path, &reply.body).await?;

        info!(kind = %kind, path = %path.display(), bytes = reply.body.len(), "Artifact saved");
        Ok(path)
    }
}

#[async_trait]
impl ArtifactStore for ArtifactFetcher {
    async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.storage.images_dir()).await?;
        tokio::fs::create_dir_all(self.storage.videos_dir()).await?;
        Ok(())
    }

    async fn store(&self, url: &str, kind: ArtifactKind) -> Result<PathBuf> {
        self.fetch_and_store(url, kind).await
    }
}
