//! Builds the configured object store provider.

use std::sync::Arc;

use meshbatch_core::config::storage::StorageConfig;
use meshbatch_core::error::AppError;
use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::ObjectStore;

use crate::providers::{LocalObjectStore, S3ObjectStore};

/// Instantiate the provider named by `config.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.provider.as_str() {
        "s3" => Arc::new(S3ObjectStore::new(&config.s3).await?),
        "local" => Arc::new(
            LocalObjectStore::new(&config.local.root_path, config.local.page_size).await?,
        ),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider '{other}' (expected 's3' or 'local')"
            )));
        }
    };

    tracing::info!(provider = store.provider_type(), "Object store initialized");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbatch_core::error::ErrorKind;

    #[tokio::test]
    async fn test_build_local_store() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = StorageConfig::default();
        config.provider = "local".to_string();
        config.local.root_path = temp.path().to_string_lossy().to_string();

        let store = build_object_store(&config).await.expect("build");
        assert_eq!(store.provider_type(), "local");
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let mut config = StorageConfig::default();
        config.provider = "ftp".to_string();
        let err = build_object_store(&config).await.expect_err("should fail");
        assert!(err.is(ErrorKind::Configuration));
    }
}
