pub mod config;
mod routes;
pub mod schemas;
mod state;

use std::sync::Arc;
use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};
use vt_core::job::JobClient;
use vt_core::transport::ReqwestTransport;
use vt_core::{ArtifactFetcher, GarmentCatalog, GarmentCompositor, TryOnFlow, VideoAnimator};
use crate::backend::config::AppConfig;
use crate::backend::routes::api_routes;
use crate::backend::state::AppState;
use crate::prompts::default_prompts;

pub struct Backend {
    config: AppConfig,
    state: Arc<AppState>,
}

impl Backend {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        if config.api.api_key.is_empty() {
            warn!("WSAI_KEY is not set; remote calls will be rejected");
        }

        let transport = Arc::new(
            ReqwestTransport::new(&config.api).context("Failed to create API transport")?,
        );
        let client = JobClient::new(transport.clone(), config.api.clone());

        let flow = TryOnFlow::new(
            Arc::new(GarmentCompositor::new(client.clone())),
            Arc::new(VideoAnimator::new(client)),
            Arc::new(ArtifactFetcher::new(transport, config.storage.clone())),
            GarmentCatalog::new(config.garment_dir.clone()),
            default_prompts(),
        );

        Ok(Self {
            config,
            state: Arc::new(AppState::new(flow)),
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .merge(api_routes())
            .with_state(self.state.clone())
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;

        info!(
            port = self.config.port,
            garments = %self.config.garment_dir.display(),
            results = %self.config.storage.result_dir.display(),
            "Starting try-on server"
        );

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
