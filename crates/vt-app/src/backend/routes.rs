use std::sync::Arc;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use crate::backend::routes::garments::{list_garments, preview_garment};
use crate::backend::routes::tryon::{MAX_UPLOAD_BYTES, generate};
use crate::backend::state::AppState;

mod garments;
mod tryon;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/garments", get(list_garments))
        .route("/api/garments/{name}/preview", get(preview_garment))
        .route(
            "/api/tryon",
            post(generate).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
