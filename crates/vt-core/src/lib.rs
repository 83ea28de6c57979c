pub mod artifact;
pub mod config;
pub mod error;
pub mod flow;
pub mod garment;
pub mod job;
pub mod payload;
pub mod progress;
pub mod services;
pub mod transport;

pub use artifact::{ArtifactFetcher, ArtifactKind, ArtifactStore};
pub use config::{ApiConfig, Prompts, StorageConfig};
pub use error::{Error, Result};
pub use flow::TryOnFlow;
pub use garment::GarmentCatalog;
pub use services::{Animator, Compositor, GarmentCompositor, VideoAnimator, VideoRequest};
