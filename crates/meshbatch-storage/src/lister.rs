//! Paginated object listing.

use std::sync::Arc;

use tracing::{debug, info};

use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::ObjectStore;
use meshbatch_core::types::ObjectKey;

/// Default maximum number of keys returned by [`ObjectLister::list`].
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Collects keys under a prefix by following list markers page by page.
#[derive(Debug, Clone)]
pub struct ObjectLister {
    store: Arc<dyn ObjectStore>,
}

impl ObjectLister {
    /// Create a lister over the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Return up to `limit` keys under `prefix`, in listing order.
    ///
    /// The last key of the accumulated list is passed as the marker for the
    /// next page. Listing stops once `limit` keys are held, the store
    /// reports no further results, or a page comes back empty. Store errors
    /// propagate as-is.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> AppResult<Vec<ObjectKey>> {
        let mut keys: Vec<ObjectKey> = Vec::new();
        if limit == 0 {
            return Ok(keys);
        }

        let mut pages = 0usize;
        loop {
            let marker = keys.last().map(ObjectKey::as_str);
            let page = self.store.list_page(bucket, prefix, marker).await?;
            pages += 1;

            let page_len = page.keys.len();
            keys.extend(page.keys);

            debug!(
                bucket,
                prefix,
                page = pages,
                page_len,
                total = keys.len(),
                is_truncated = page.is_truncated,
                "Fetched list page"
            );

            // An empty page cannot advance the marker.
            if keys.len() >= limit || !page.is_truncated || page_len == 0 {
                break;
            }
        }

        keys.truncate(limit);
        info!(bucket, prefix, count = keys.len(), pages, "Listed objects");
        Ok(keys)
    }

    /// [`ObjectLister::list`] with [`DEFAULT_LIST_LIMIT`].
    pub async fn list_default(&self, bucket: &str, prefix: &str) -> AppResult<Vec<ObjectKey>> {
        self.list(bucket, prefix, DEFAULT_LIST_LIMIT).await
    }
}
