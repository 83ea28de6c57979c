//! End-to-end try-on generation.
//!
//! One call to [`TryOnFlow::run`] composites the person into the front (and,
//! when the catalog has one, rear) garment view, animates the result into a
//! rotating video and stores every artifact locally. Front compositing and
//! video generation are mandatory; the rear view only adds an end pose.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::artifact::{ArtifactKind, ArtifactStore};
use crate::config::Prompts;
use crate::error::{Error, Result};
use crate::garment::{GarmentCatalog, is_front_name};
use crate::progress::ProgressReporter;
use crate::services::{Animator, Compositor, VideoRequest};

#[derive(Clone)]
pub struct TryOnFlow {
    compositor: Arc<dyn Compositor>,
    animator: Arc<dyn Animator>,
    store: Arc<dyn ArtifactStore>,
    catalog: GarmentCatalog,
    prompts: Prompts,
    duration_secs: u32,
}

impl TryOnFlow {
    pub fn new(
        compositor: Arc<dyn Compositor>,
        animator: Arc<dyn Animator>,
        store: Arc<dyn ArtifactStore>,
        catalog: GarmentCatalog,
        prompts: Prompts,
    ) -> Self {
        Self {
            compositor,
            animator,
            store,
            catalog,
            prompts,
            duration_secs: VideoRequest::DEFAULT_DURATION_SECS,
        }
    }

    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }

    /// Generate a try-on video and return its local path.
    ///
    /// Rear and front compositing run concurrently; the video step starts
    /// once both have finished. Artifacts saved before a later failure stay
    /// on disk.
    pub async fn run(
        &self,
        person: Option<&Path>,
        garment: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let person = person.filter(|p| !p.as_os_str().is_empty());
        let garment = garment.map(str::trim).filter(|g| !g.is_empty());
        let (Some(person), Some(garment)) = (person, garment) else {
            return Err(Error::InvalidInput(
                "person image and garment selection are required".to_string(),
            ));
        };
        if !is_front_name(garment) {
            return Err(Error::InvalidInput(format!(
                "unknown garment selection: {}",
                garment
            )));
        }

        self.store.prepare().await?;

        progress.report(0.0, "🔍 Preparing garment images...");
        let front_garment = self.catalog.front_path(garment);
        let rear_garment = self.catalog.rear_path(garment);

        let rear_task = async {
            let rear_garment = rear_garment.as_deref()?;
            progress.report(0.1, "🔍 Rear garment found. Generating rear view...");
            self.compositor
                .composite(person, rear_garment, &self.prompts.rear_image)
                .await
        };
        let front_task = async {
            progress.report(0.2, "🎨 Generating front view...");
            self.compositor
                .composite(person, &front_garment, &self.prompts.front_image)
                .await
        };
        let (rear_image, front_image) = tokio::join!(rear_task, front_task);

        let Some(front_image) = front_image else {
            return Err(Error::FrontGenerationFailed);
        };
        if rear_garment.is_some() && rear_image.is_none() {
            info!(garment, "Rear view unavailable, continuing with front view only");
        }

        progress.report(0.6, "🎬 Creating video...");
        let request = VideoRequest::new(front_image.clone(), self.prompts.video.clone())
            .with_end_image(rear_image.clone())
            .with_duration(self.duration_secs);
        let Some(video) = self.animator.animate(request).await else {
            return Err(Error::VideoGenerationFailed);
        };

        progress.report(0.9, "💾 Saving results...");
        self.save_image(&front_image, ArtifactKind::Front).await;
        if let Some(rear_image) = &rear_image {
            self.save_image(rear_image, ArtifactKind::Rear).await;
        }

        let video_path = self.store.store(&video, ArtifactKind::Video).await?;
        progress.report(1.0, "✅ Done");
        info!(garment, path = %video_path.display(), "Try-on video ready");

        Ok(video_path)
    }

    /// Photos are a by-product; failing to keep one does not fail the flow.
    async fn save_image(&self, url: &str, kind: ArtifactKind) {
        if let Err(e) = self.store.store(url, kind).await {
            warn!(kind = %kind, error = %e, "Failed to save image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactFetcher, MockArtifactStore};
    use crate::config::StorageConfig;
    use crate::progress::NoProgress;
    use crate::services::{MockAnimator, MockCompositor};
    use crate::transport::{HttpReply, MockTransport};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn prompts() -> Prompts {
        Prompts {
            front_image: "front prompt".into(),
            rear_image: "rear prompt".into(),
            video: "video prompt".into(),
        }
    }

    fn garments(dir: &TempDir, names: &[&str]) -> GarmentCatalog {
        let folder = dir.path().join("garment");
        std::fs::create_dir_all(&folder).unwrap();
        for name in names {
            std::fs::write(folder.join(name), b"garment").unwrap();
        }
        GarmentCatalog::new(folder)
    }

    fn flow(
        compositor: MockCompositor,
        animator: MockAnimator,
        store: impl ArtifactStore + 'static,
        catalog: GarmentCatalog,
    ) -> TryOnFlow {
        TryOnFlow::new(
            Arc::new(compositor),
            Arc::new(animator),
            Arc::new(store),
            catalog,
            prompts(),
        )
    }

    #[tokio::test]
    async fn test_front_only_when_rear_missing() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .withf(|_, garment, prompt| {
                garment.ends_with("dress1_front.png") && prompt == "front prompt"
            })
            .times(1)
            .returning(|_, _, _| Some("https://cdn/front.jpeg".into()));

        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .withf(|request| {
                request.start_image == "https://cdn/front.jpeg"
                    && request.prompt == "video prompt"
                    && request.end_image.is_none()
                    && request.duration_secs == 5
            })
            .times(1)
            .returning(|_| Some("https://cdn/out.mp4".into()));

        let mut transport = MockTransport::new();
        transport
            .expect_download()
            .times(2)
            .returning(|_| Ok(HttpReply::new(200, "bytes")));
        let result_dir = dir.path().join("result");
        let fetcher = ArtifactFetcher::new(
            Arc::new(transport),
            StorageConfig {
                result_dir: result_dir.clone(),
            },
        );

        let path = flow(compositor, animator, fetcher, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap();

        assert!(path.starts_with(result_dir.join("videos")));
        assert!(path.exists());
        let images: Vec<_> = std::fs::read_dir(result_dir.join("images")).unwrap().collect();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_front_and_rear() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png", "dress1_rear.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .withf(|_, garment, prompt| garment.ends_with("dress1_rear.png") && prompt == "rear prompt")
            .times(1)
            .returning(|_, _, _| Some("https://cdn/rear.jpeg".into()));
        compositor
            .expect_composite()
            .withf(|_, garment, prompt| garment.ends_with("dress1_front.png") && prompt == "front prompt")
            .times(1)
            .returning(|_, _, _| Some("https://cdn/front.jpeg".into()));

        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .withf(|request| {
                request.start_image == "https://cdn/front.jpeg"
                    && request.end_image.as_deref() == Some("https://cdn/rear.jpeg")
            })
            .times(1)
            .returning(|_| Some("https://cdn/out.mp4".into()));

        let stored = Arc::new(Mutex::new(Vec::new()));
        let mut store = MockArtifactStore::new();
        store.expect_prepare().times(1).returning(|| Ok(()));
        let log = stored.clone();
        store.expect_store().times(3).returning(move |url, kind| {
            log.lock().unwrap().push((url.to_string(), kind));
            Ok(PathBuf::from(format!("result/{}", kind.file_name(uuid::Uuid::nil()))))
        });

        let path = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap();

        assert_eq!(
            path,
            PathBuf::from("result/00000000-0000-0000-0000-000000000000.mp4")
        );
        let stored = stored.lock().unwrap();
        assert_eq!(
            stored.as_slice(),
            &[
                ("https://cdn/front.jpeg".to_string(), ArtifactKind::Front),
                ("https://cdn/rear.jpeg".to_string(), ArtifactKind::Rear),
                ("https://cdn/out.mp4".to_string(), ArtifactKind::Video),
            ]
        );
    }

    #[tokio::test]
    async fn test_rear_failure_downgrades_to_front_only() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png", "dress1_rear.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .returning(|_, garment, _| {
                garment
                    .ends_with("dress1_front.png")
                    .then(|| "https://cdn/front.jpeg".to_string())
            })
            .times(2);

        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .withf(|request| request.end_image.is_none())
            .times(1)
            .returning(|_| Some("https://cdn/out.mp4".into()));

        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store
            .expect_store()
            .withf(|_, kind| *kind != ArtifactKind::Rear)
            .times(2)
            .returning(|_, _| Ok(PathBuf::from("result/videos/x.mp4")));

        let result = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_front_failure_aborts_before_video() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png", "dress1_rear.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .returning(|_, garment, _| {
                garment
                    .ends_with("dress1_rear.png")
                    .then(|| "https://cdn/rear.jpeg".to_string())
            })
            .times(2);

        let mut animator = MockAnimator::new();
        animator.expect_animate().never();

        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store.expect_store().never();

        let err = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FrontGenerationFailed));
    }

    #[tokio::test]
    async fn test_video_failure_aborts_before_saving() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .times(1)
            .returning(|_, _, _| Some("https://cdn/front.jpeg".into()));

        let mut animator = MockAnimator::new();
        animator.expect_animate().times(1).returning(|_| None);

        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store.expect_store().never();

        let err = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VideoGenerationFailed));
    }

    #[tokio::test]
    async fn test_missing_inputs() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        let person = dir.path().join("person.jpg");

        let cases: [(Option<&Path>, Option<&str>); 4] = [
            (None, Some("dress1_front.png")),
            (Some(person.as_path()), None),
            (Some(person.as_path()), Some("  ")),
            (Some(Path::new("")), Some("dress1_front.png")),
        ];

        for (person, garment) in cases {
            let mut compositor = MockCompositor::new();
            compositor.expect_composite().never();
            let mut animator = MockAnimator::new();
            animator.expect_animate().never();
            let mut store = MockArtifactStore::new();
            store.expect_prepare().never();
            store.expect_store().never();

            let err = flow(compositor, animator, store, catalog.clone())
                .run(person, garment, &NoProgress)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_progress_checkpoints() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .returning(|_, _, _| Some("https://cdn/front.jpeg".into()));
        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .returning(|_| Some("https://cdn/out.mp4".into()));
        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store
            .expect_store()
            .returning(|_, _| Ok(PathBuf::from("result/videos/x.mp4")));

        let seen = Mutex::new(Vec::new());
        let reporter = |fraction: f32, _: &str| seen.lock().unwrap().push(fraction);

        flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &reporter)
            .await
            .unwrap();

        assert_eq!(seen.into_inner().unwrap(), vec![0.0, 0.2, 0.6, 0.9, 1.0]);
    }

    #[tokio::test]
    async fn test_garment_outside_catalog_is_rejected() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        std::fs::write(dir.path().join("x_front.png"), b"garment").unwrap();
        let person = dir.path().join("person.jpg");

        for garment in ["/etc/passwd", "../x_front.png", "coat.png"] {
            let mut compositor = MockCompositor::new();
            compositor.expect_composite().never();
            let mut animator = MockAnimator::new();
            animator.expect_animate().never();
            let mut store = MockArtifactStore::new();
            store.expect_prepare().never();
            store.expect_store().never();

            let err = flow(compositor, animator, store, catalog.clone())
                .run(Some(person.as_path()), Some(garment), &NoProgress)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{garment} accepted");
        }
    }

    #[tokio::test]
    async fn test_photo_download_failure_keeps_video() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png", "dress1_rear.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .times(2)
            .returning(|_, garment, _| {
                if garment.ends_with("dress1_rear.png") {
                    Some("https://cdn/rear.jpeg".into())
                } else {
                    Some("https://cdn/front.jpeg".into())
                }
            });
        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .times(1)
            .returning(|_| Some("https://cdn/out.mp4".into()));

        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store
            .expect_store()
            .withf(|_, kind| *kind != ArtifactKind::Video)
            .times(2)
            .returning(|url, _| {
                Err(Error::DownloadFailed {
                    url: url.to_string(),
                    status: Some(404),
                    message: "gone".into(),
                })
            });
        store
            .expect_store()
            .withf(|_, kind| *kind == ArtifactKind::Video)
            .times(1)
            .returning(|_, _| Ok(PathBuf::from("result/videos/x.mp4")));

        let path = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("result/videos/x.mp4"));
    }

    #[tokio::test]
    async fn test_video_download_failure_is_returned() {
        let dir = TempDir::new().unwrap();
        let catalog = garments(&dir, &["dress1_front.png"]);
        let person = dir.path().join("person.jpg");

        let mut compositor = MockCompositor::new();
        compositor
            .expect_composite()
            .times(1)
            .returning(|_, _, _| Some("https://cdn/front.jpeg".into()));
        let mut animator = MockAnimator::new();
        animator
            .expect_animate()
            .times(1)
            .returning(|_| Some("https://cdn/out.mp4".into()));

        let mut store = MockArtifactStore::new();
        store.expect_prepare().returning(|| Ok(()));
        store
            .expect_store()
            .withf(|_, kind| *kind == ArtifactKind::Front)
            .times(1)
            .returning(|_, _| Ok(PathBuf::from("result/images/x_front.jpeg")));
        store
            .expect_store()
            .withf(|_, kind| *kind == ArtifactKind::Video)
            .times(1)
            .returning(|url, _| {
                Err(Error::DownloadFailed {
                    url: url.to_string(),
                    status: Some(500),
                    message: "upstream error".into(),
                })
            });

        let err = flow(compositor, animator, store, catalog)
            .run(Some(person.as_path()), Some("dress1_front.png"), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DownloadFailed { status: Some(500), .. }));
    }
}
