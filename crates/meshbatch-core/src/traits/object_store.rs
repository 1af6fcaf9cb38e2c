//! Object store trait for pluggable listing and download backends.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::ObjectKey;

/// One page of a marker-based listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListPage {
    /// Keys in the store's listing order, all strictly after the marker.
    pub keys: Vec<ObjectKey>,
    /// Whether the store holds more matching keys past this page.
    pub is_truncated: bool,
}

/// Trait for object storage backends.
///
/// The [`ObjectStore`] trait is defined here in `meshbatch-core` and
/// implemented in `meshbatch-storage` (S3 and local directory providers).
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "local").
    fn provider_type(&self) -> &str;

    /// Check whether the bucket is reachable.
    async fn health_check(&self, bucket: &str) -> AppResult<bool>;

    /// List one page of keys under `prefix`, resuming after `marker`.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<&str>,
    ) -> AppResult<ListPage>;

    /// Fetch the object at `key` into `dest`, returning the bytes written.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> AppResult<u64>;
}
