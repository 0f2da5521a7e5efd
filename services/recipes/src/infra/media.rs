use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::repository::MediaStore;
use crate::domain::types::ImageUpload;
use crate::error::RecipesServiceError;

/// Stores uploads as files under `root`; paths are relative to it and served at `/media/`.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    pub root: PathBuf,
}

impl FsMediaStore {
    /// Resolve a stored media path, refusing anything that escapes `root`.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

impl MediaStore for FsMediaStore {
    async fn save(&self, dir: &str, image: &ImageUpload) -> Result<String, RecipesServiceError> {
        let path = format!("{dir}/{}.{}", Uuid::now_v7(), image.extension);
        let full = self
            .resolve(&path)
            .with_context(|| format!("invalid media directory {dir:?}"))?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media directory {}", parent.display()))?;
        }
        tokio::fs::write(&full, &image.bytes)
            .await
            .with_context(|| format!("write media file {}", full.display()))?;
        tracing::debug!(path, bytes = image.bytes.len(), "media saved");
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), RecipesServiceError> {
        let Some(full) = self.resolve(path) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("delete media file {}", full.display()))
                .into()),
        }
    }
}
