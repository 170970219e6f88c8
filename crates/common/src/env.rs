//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the upload root exists and is a directory.
///
/// The size-specific subdirectories are created lazily by the upload
/// pipeline; only the root is checked here so a misconfigured path fails
/// at startup instead of on the first upload.
pub async fn ensure_env(upload_root: impl AsRef<Path>) -> anyhow::Result<()> {
    let upload_root = upload_root.as_ref();
    match tokio::fs::metadata(upload_root).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{} exists but is not a directory", upload_root.display())),
        Err(_) => {
            warn!(dir = %upload_root.display(), "upload directory missing; creating it");
            tokio::fs::create_dir_all(upload_root)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", upload_root.display()))?;
            info!(dir = %upload_root.display(), "upload directory created");
            Ok(())
        }
    }
}
