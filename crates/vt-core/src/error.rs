use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("job submission failed ({}): {message}", status_label(.status))]
    SubmissionFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("polling job {job_id} failed ({}): {message}", status_label(.status))]
    PollFailed {
        job_id: String,
        status: Option<u16>,
        message: String,
    },

    #[error("job {job_id} failed remotely: {reason}")]
    RemoteJobFailed { job_id: String, reason: String },

    #[error("job {job_id} timed out after {attempts} polls")]
    TimedOut { job_id: String, attempts: u32 },

    #[error("download of {url} failed ({}): {message}", status_label(.status))]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("no URL provided")]
    NoUrl,

    #[error("front image generation failed")]
    FrontGenerationFailed,

    #[error("video generation failed")]
    VideoGenerationFailed,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_string(),
    }
}

impl Error {
    /// Short message meant for the person driving the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(_) => "❌ Person image and Garment selection are required".into(),
            Self::FrontGenerationFailed => "❌ Front image generation failed".into(),
            Self::VideoGenerationFailed => "❌ Video generation failed".into(),
            Self::NotFound(path) => format!("❌ File not found: {}", path.display()),
            Self::NoUrl | Self::DownloadFailed { .. } => "❌ Saving results failed".into(),
            other => format!("❌ {}", other),
        }
    }
}
