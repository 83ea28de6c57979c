mod backend;
mod error;
mod prompts;

use tracing_subscriber::EnvFilter;
use crate::backend::Backend;
use crate::backend::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    Backend::new(config)?.serve().await
}
