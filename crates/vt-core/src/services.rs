//! Remote generation services used by the try-on flow.
//!
//! Both adapters run on top of [`JobClient`](crate::job::JobClient) and report
//! a missing result as `None`; the typed error only reaches the logs.

use std::path::Path;

use async_trait::async_trait;

mod compositing;
mod video;

pub use compositing::{GarmentCompositor, Resolution};
pub use video::VideoAnimator;

/// Person + garment photo in, composited photo URL out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn composite(&self, person: &Path, garment: &Path, prompt: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub start_image: String,
    pub prompt: String,
    /// Second pose to interpolate towards.
    pub end_image: Option<String>,
    pub duration_secs: u32,
}

impl VideoRequest {
    pub const DEFAULT_DURATION_SECS: u32 = 5;

    pub fn new(start_image: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            start_image: start_image.into(),
            prompt: prompt.into(),
            end_image: None,
            duration_secs: Self::DEFAULT_DURATION_SECS,
        }
    }

    pub fn with_end_image(mut self, end_image: Option<String>) -> Self {
        self.end_image = end_image;
        self
    }

    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

/// Still image URL(s) in, rotating video URL out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Animator: Send + Sync {
    async fn animate(&self, request: VideoRequest) -> Option<String>;
}
