//! Directory-backed object store provider.
//!
//! Mirrors the S3 `ListObjects` contract over a local tree: keys are
//! returned in lexicographic order, strictly after the marker, at most
//! `page_size` per call.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use meshbatch_core::error::{AppError, ErrorKind};
use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::{ListPage, ObjectStore};
use meshbatch_core::types::ObjectKey;

/// Local filesystem object store. Each bucket is a sub-directory of `root`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Directory containing one sub-directory per bucket.
    root: PathBuf,
    /// Maximum keys per page.
    page_size: usize,
}

impl LocalObjectStore {
    /// Create a new local object store rooted at the given path.
    pub async fn new(root_path: impl Into<PathBuf>, page_size: usize) -> AppResult<Self> {
        let root = root_path.into();
        if page_size == 0 {
            return Err(AppError::validation("Local store page size must be > 0"));
        }
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create store root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, page_size })
    }

    /// Maximum keys returned per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn bucket_dir(&self, bucket: &str) -> AppResult<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == ".." {
            return Err(AppError::validation(format!("Invalid bucket name: {bucket}")));
        }
        Ok(self.root.join(bucket))
    }

    /// Resolve a key to a path inside the bucket, rejecting traversal.
    fn resolve(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::validation(format!("Invalid object key: {key}")));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }

    /// Collect every key under `dir`, `/`-separated and relative to `base`.
    fn collect_keys(base: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                Self::collect_keys(base, &path, out)?;
            } else if let Ok(rel) = path.strip_prefix(base) {
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self, bucket: &str) -> AppResult<bool> {
        let dir = self.bucket_dir(bucket)?;
        Ok(fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false))
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> AppResult<ListPage> {
        let dir = self.bucket_dir(bucket)?;
        if !fs::try_exists(&dir).await? {
            return Err(AppError::not_found(format!("Bucket not found: {bucket}")));
        }

        let walk_dir = dir.clone();
        let mut keys = tokio::task::spawn_blocking(move || {
            let mut keys = Vec::new();
            Self::collect_keys(&walk_dir, &walk_dir, &mut keys).map(|_| keys)
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Listing task panicked", e))??;

        keys.retain(|k| k.starts_with(prefix) && marker.is_none_or(|m| k.as_str() > m));
        keys.sort();

        let is_truncated = keys.len() > self.page_size;
        keys.truncate(self.page_size);

        debug!(bucket, prefix, marker = ?marker, count = keys.len(), is_truncated, "Listed local page");

        Ok(ListPage {
            keys: keys.into_iter().map(ObjectKey::from).collect(),
            is_truncated,
        })
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> AppResult<u64> {
        let source = self.resolve(bucket, key)?;
        fs::copy(&source, dest).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {bucket}/{key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to copy {bucket}/{key} to {}", dest.display()),
                    e,
                )
            }
        })
    }
}
