//! Single-object download into a local staging directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use meshbatch_core::error::AppError;
use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::ObjectStore;
use meshbatch_core::types::ObjectKey;

/// Downloads objects into a fixed staging directory.
#[derive(Debug, Clone)]
pub struct ObjectDownloader {
    store: Arc<dyn ObjectStore>,
    staging_dir: PathBuf,
}

impl ObjectDownloader {
    /// Create a downloader writing into `staging_dir`.
    pub fn new(store: Arc<dyn ObjectStore>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    /// The staging directory downloads land in.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Fetch `key` from `bucket` to `staging_dir/filename`.
    ///
    /// `filename` must be a bare file name. Transport errors propagate.
    pub async fn download(&self, bucket: &str, key: &str, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(AppError::validation(format!(
                "Download target must be a plain file name: '{filename}'"
            )));
        }

        tokio::fs::create_dir_all(&self.staging_dir).await?;
        let dest = self.staging_dir.join(filename);

        let bytes = self.store.download(bucket, key, &dest).await?;
        info!(bucket, key, bytes, dest = %dest.display(), "Downloaded object");
        Ok(dest)
    }

    /// Fetch `key` using its last path segment as the local file name.
    pub async fn download_key(&self, bucket: &str, key: &ObjectKey) -> AppResult<PathBuf> {
        let filename = key.file_name().ok_or_else(|| {
            AppError::validation(format!("Object key has no file name: '{key}'"))
        })?;
        self.download(bucket, key.as_str(), filename).await
    }
}
