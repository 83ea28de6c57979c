use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::job::{JobClient, PollPolicy};
use crate::payload;
use crate::services::Compositor;

pub const EDIT_MODEL_PATH: &str = "google/nano-banana-pro/edit";
pub const UPLOAD_BUDGET_KB: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    OneK,
    TwoK,
    FourK,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1k",
            Self::TwoK => "2k",
            Self::FourK => "4k",
        }
    }
}

/// Garment compositing on the image-editing model.
#[derive(Clone)]
pub struct GarmentCompositor {
    client: JobClient,
    endpoint: String,
    policy: PollPolicy,
    resolution: Resolution,
}

impl GarmentCompositor {
    pub fn new(client: JobClient) -> Self {
        let endpoint = client.config().endpoint(EDIT_MODEL_PATH);
        Self {
            client,
            endpoint,
            policy: PollPolicy::new(Duration::from_millis(100), 360),
            resolution: Resolution::OneK,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Like [`Compositor::composite`] but keeps the failure reason.
    pub async fn try_composite(&self, person: &Path, garment: &Path, prompt: &str) -> Result<String> {
        let images = encode_pair(person.to_path_buf(), garment.to_path_buf()).await?;

        // The edit model accepts up to three reference images.
        let payload = json!({
            "aspect_ratio": "9:16",
            "enable_base64_output": false,
            "enable_sync_mode": false,
            "images": images,
            "output_format": "jpeg",
            "prompt": prompt,
            "resolution": self.resolution.as_str(),
        });

        self.client
            .submit_and_wait(&self.endpoint, &payload, &self.policy)
            .await
    }
}

#[async_trait]
impl Compositor for GarmentCompositor {
    async fn composite(&self, person: &Path, garment: &Path, prompt: &str) -> Option<String> {
        match self.try_composite(person, garment, prompt).await {
            Ok(url) => {
                info!(garment = %garment.display(), url = %url, "Composited garment");
                Some(url)
            }
            Err(e) => {
                warn!(garment = %garment.display(), error = %e, "Garment compositing failed");
                None
            }
        }
    }
}

/// Image decoding and re-encoding is CPU bound, keep it off the async workers.
async fn encode_pair(person: PathBuf, garment: PathBuf) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
        Ok(vec![
            payload::encode_data_uri(&person, Some(UPLOAD_BUDGET_KB))?,
            payload::encode_data_uri(&garment, Some(UPLOAD_BUDGET_KB))?,
        ])
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))?
}
