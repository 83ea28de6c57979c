use std::sync::Arc;
use axum::Json;
use axum::extract::{Path, State};
use crate::backend::schemas::{GarmentList, PreviewResponse};
use crate::backend::state::AppState;
use crate::error::AppError;

pub async fn list_garments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GarmentList>, AppError> {
    let garments = state
        .flow
        .catalog()
        .list_fronts()
        .map_err(|e| AppError::BackendError(format!("Failed to read garment folder: {}", e)))?;

    Ok(Json(GarmentList { garments }))
}

pub async fn preview_garment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<PreviewResponse> {
    let (front, rear) = state.flow.catalog().previews(&name);
    Json(PreviewResponse { front, rear })
}
