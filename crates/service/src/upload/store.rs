use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::UploadError;

/// Where upload variants land.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn ensure_directory(&self, path: &Path) -> Result<(), UploadError>;
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), UploadError>;
    /// Removing a file that is already gone is not an error.
    async fn remove(&self, path: &Path) -> Result<(), UploadError>;
}

/// Local filesystem via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

#[async_trait]
impl FileStore for LocalFileStore {
    async fn ensure_directory(&self, path: &Path) -> Result<(), UploadError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(UploadError::Io(format!("{} exists and is not a directory", path.display()))),
            Err(_) => {
                debug!(path = %path.display(), "creating upload directory");
                tokio::fs::create_dir_all(path)
                    .await
                    .map_err(|e| UploadError::Io(format!("{}: {}", path.display(), e)))
            }
        }
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), UploadError> {
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| UploadError::Io(format!("{}: {}", path.display(), e)))
    }

    async fn remove(&self, path: &Path) -> Result<(), UploadError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}
