use std::path::{Component, Path, PathBuf};

use crate::error::Result;

pub const FRONT_MARKER: &str = "_front";
pub const REAR_MARKER: &str = "_rear";

/// Folder of garment photos keyed by their front-view file name.
#[derive(Debug, Clone)]
pub struct GarmentCatalog {
    folder: PathBuf,
}

impl GarmentCatalog {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Front-view garment identifiers, sorted. A missing folder is an empty catalog.
    pub fn list_fronts(&self) -> Result<Vec<String>> {
        if !self.folder.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.folder)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.contains(FRONT_MARKER) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn front_path(&self, garment: &str) -> PathBuf {
        self.folder.join(garment)
    }

    /// Where the matching rear view would be, whether or not it exists.
    pub fn rear_candidate(&self, garment: &str) -> PathBuf {
        self.folder.join(rear_name(garment))
    }

    pub fn rear_path(&self, garment: &str) -> Option<PathBuf> {
        let path = self.rear_candidate(garment);
        path.exists().then_some(path)
    }

    /// Front and (if present) rear image paths for preview.
    pub fn previews(&self, garment: &str) -> (Option<PathBuf>, Option<PathBuf>) {
        if !is_front_name(garment) {
            return (None, None);
        }
        (Some(self.front_path(garment)), self.rear_path(garment))
    }
}

pub fn rear_name(front: &str) -> String {
    front.replace(FRONT_MARKER, REAR_MARKER)
}

/// A garment identifier is a bare file name carrying [`FRONT_MARKER`].
pub fn is_front_name(garment: &str) -> bool {
    let mut components = Path::new(garment).components();
    let single_file = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    single_file && garment.contains(FRONT_MARKER)
}
