use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use tempfile::NamedTempFile;
use tracing::{error, info};
use vt_core::progress::ProgressReporter;
use crate::backend::schemas::TryOnResponse;
use crate::backend::state::AppState;
use crate::error::AppError;

/// Largest accepted request body (person photo plus form fields).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Forwards flow checkpoints to the log.
struct LogProgress {
    garment: String,
}

impl ProgressReporter for LogProgress {
    fn report(&self, fraction: f32, message: &str) {
        info!(garment = %self.garment, progress = fraction, "{}", message);
    }
}

/// `multipart/form-data` body of a try-on request: a `person` file part and
/// a `garment` text part. The uploaded photo lives in a temp file that is
/// removed when the form is dropped.
#[derive(Default)]
struct TryOnForm {
    person: Option<NamedTempFile>,
    garment: Option<String>,
}

impl TryOnForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("person") => {
                    let suffix = upload_suffix(field.file_name());
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.person = Some(spool(bytes, suffix).await?);
                    }
                }
                Some("garment") => form.garment = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(form)
    }

    fn person_path(&self) -> Option<&Path> {
        self.person.as_ref().map(NamedTempFile::path)
    }
}

/// Keeps the client's image extension so the encoder can detect the MIME type.
fn upload_suffix(file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg");
    format!(".{}", ext.to_ascii_lowercase())
}

async fn spool(bytes: Bytes, suffix: String) -> Result<NamedTempFile, AppError> {
    tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("person-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| AppError::BackendError(format!("Upload task failed: {}", e)))?
    .map_err(|e| AppError::BackendError(format!("Failed to store uploaded image: {}", e)))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TryOnResponse>, AppError> {
    let form = TryOnForm::read(&mut multipart).await?;
    let progress = LogProgress {
        garment: form.garment.clone().unwrap_or_default(),
    };

    let video_path = state
        .flow
        .run(form.person_path(), form.garment.as_deref(), &progress)
        .await
        .map_err(|e| {
            error!(error = %e, "Try-on generation failed");
            AppError::from(e)
        })?;

    Ok(Json(TryOnResponse { video_path }))
}
