use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;
use vt_core::{ApiConfig, StorageConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub garment_dir: PathBuf,
}

impl AppConfig {
    /// Reads `.env` if there is one, then the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "7860".to_string())
            .parse()
            .context("PORT must be a number")?;

        let mut api = ApiConfig::new(var("WSAI_KEY").unwrap_or_default());
        if let Some(base_url) = var("WSAI_API_BASE") {
            api.base_url = base_url;
        }
        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("REQUEST_TIMEOUT_SECS must be a number")?;
            api.request_timeout = Duration::from_secs(secs);
        }

        let mut storage = StorageConfig::default();
        if let Some(dir) = var("RESULT_DIR") {
            storage.result_dir = PathBuf::from(dir);
        }

        let garment_dir = var("GARMENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/garment"));

        Ok(Self {
            port,
            api,
            storage,
            garment_dir,
        })
    }
}
