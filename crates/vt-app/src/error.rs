use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vt_core::Error as CoreError;

use crate::backend::schemas::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Flow(#[from] CoreError),

    #[error("Invalid upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("Error from backend: {0}")]
    BackendError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Flow(CoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Upload(e) => e.status(),
            Self::Flow(CoreError::FrontGenerationFailed | CoreError::VideoGenerationFailed) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Flow(CoreError::NoUrl | CoreError::DownloadFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::Flow(_) | Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Flow(e) => e.user_message(),
            Self::Upload(e) => format!("❌ Could not read upload: {}", e.body_text()),
            Self::BackendError(msg) => format!("❌ {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
