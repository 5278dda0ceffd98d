use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::BlobStore;
use crate::errors::AppError;

/// Keeps blobs on disk under `{root}/photos/`.
pub struct LocalBlobStore {
    photos_dir: PathBuf,
}

impl LocalBlobStore {
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, AppError> {
        let photos_dir = root.as_ref().join("photos");
        fs::create_dir_all(&photos_dir).await?;
        Ok(LocalBlobStore { photos_dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(AppError::StorageError(format!("invalid blob key: {}", key)));
        }
        Ok(self.photos_dir.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if let Err(err) = fs::write(&path, bytes).await {
            let _ = fs::remove_file(&path).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
