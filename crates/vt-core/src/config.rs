use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.wavespeed.ai/api/v3";

/// Credentials and addressing for the remote generation API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Status URL of a submitted job.
    pub fn poll_url(&self, job_id: &str) -> String {
        self.endpoint(&format!("predictions/{}/result", job_id))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// Where downloaded artifacts land.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub result_dir: PathBuf,
}

impl StorageConfig {
    pub fn images_dir(&self) -> PathBuf {
        self.result_dir.join("images")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.result_dir.join("videos")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            result_dir: PathBuf::from("result"),
        }
    }
}

/// Prompt texts used by one try-on flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompts {
    pub front_image: String,
    pub rear_image: String,
    pub video: String,
}
