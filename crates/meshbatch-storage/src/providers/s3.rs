//! S3-compatible object store provider.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use meshbatch_core::config::storage::S3StorageConfig;
use meshbatch_core::error::{AppError, ErrorKind};
use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::{ListPage, ObjectStore};
use meshbatch_core::types::ObjectKey;

/// S3-compatible object store using the v1 `ListObjects` marker protocol.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a client from configuration.
    ///
    /// Static credentials are used when both keys are set; otherwise the
    /// default AWS credential chain applies.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        tracing::info!(
            endpoint = %config.endpoint,
            region = %config.region,
            "Initializing S3 object store"
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }
        if !config.access_key.is_empty() && !config.secret_key.is_empty() {
            builder = builder.credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "meshbatch-config",
            ));
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self, bucket: &str) -> AppResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(bucket, error = %DisplayErrorContext(&e), "S3 health check failed");
                Ok(false)
            }
        }
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> AppResult<ListPage> {
        let response = self
            .client
            .list_objects()
            .bucket(bucket)
            .prefix(prefix)
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!(
                        "ListObjects failed for s3://{bucket}/{prefix}: {}",
                        DisplayErrorContext(&e)
                    ),
                    e,
                )
            })?;

        let keys: Vec<ObjectKey> = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key())
            .map(ObjectKey::from)
            .collect();

        debug!(
            bucket,
            prefix,
            marker = ?marker,
            count = keys.len(),
            "Listed S3 page"
        );

        Ok(ListPage {
            keys,
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> AppResult<u64> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                let kind = if not_found {
                    ErrorKind::NotFound
                } else {
                    ErrorKind::ExternalService
                };
                AppError::with_source(
                    kind,
                    format!(
                        "GetObject failed for s3://{bucket}/{key}: {}",
                        DisplayErrorContext(&e)
                    ),
                    e,
                )
            })?;

        let mut body = response.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create {}", dest.display()),
                e,
            )
        })?;

        let written = tokio::io::copy(&mut body, &mut file).await?;
        file.flush().await?;

        debug!(bucket, key, bytes = written, dest = %dest.display(), "Downloaded S3 object");
        Ok(written)
    }
}
