use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::Result;
use crate::job::{JobClient, PollPolicy};
use crate::services::{Animator, VideoRequest};

pub const I2V_MODEL_PATH: &str = "wavespeed-ai/wan-2.2/i2v-480p-ultra-fast";

/// Seed value the video model reads as "pick one at random".
pub const RANDOM_SEED: i64 = -1;

/// Image-to-video generation.
#[derive(Clone)]
pub struct VideoAnimator {
    client: JobClient,
    endpoint: String,
    policy: PollPolicy,
}

impl VideoAnimator {
    pub fn new(client: JobClient) -> Self {
        let endpoint = client.config().endpoint(I2V_MODEL_PATH);
        Self {
            client,
            endpoint,
            policy: PollPolicy::new(Duration::from_secs(1), 240),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn try_animate(&self, request: &VideoRequest) -> Result<String> {
        let mut payload = json!({
            "image": request.start_image,
            "prompt": request.prompt,
            "duration": request.duration_secs,
            "seed": RANDOM_SEED,
        });
        if let Some(end_image) = &request.end_image {
            payload["last_image"] = json!(end_image);
        }

        self.client
            .submit_and_wait(&self.endpoint, &payload, &self.policy)
            .await
    }
}

#[async_trait]
impl Animator for VideoAnimator {
    async fn animate(&self, request: VideoRequest) -> Option<String> {
        match self.try_animate(&request).await {
            Ok(url) => {
                info!(url = %url, interpolated = request.end_image.is_some(), "Video generated");
                Some(url)
            }
            Err(e) => {
                warn!(error = %e, "Video generation failed");
                None
            }
        }
    }
}
