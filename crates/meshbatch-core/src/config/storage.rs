//! Object store configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level object store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    /// Provider backing the object store: `"s3"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bucket holding the STEP uploads.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Key prefix the batch lists under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Maximum number of keys collected by one listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    /// Local staging directory downloads are written to.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// S3-compatible object storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
    /// Directory-backed object store configuration.
    #[serde(default)]
    #[validate(nested)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bucket: default_bucket(),
            prefix: default_prefix(),
            list_limit: default_list_limit(),
            staging_dir: default_staging_dir(),
            s3: S3StorageConfig::default(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Endpoint URL for non-AWS services like MinIO. Empty uses AWS.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID. Empty falls back to the default credential chain.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

/// A local directory exposed through the object store interface.
///
/// Each bucket is a sub-directory of `root_path`; keys are the
/// `/`-separated relative paths of the files beneath it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocalStorageConfig {
    /// Root directory containing one sub-directory per bucket.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Maximum keys returned per list page.
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: usize,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            page_size: default_page_size(),
        }
    }
}

fn default_provider() -> String {
    "s3".to_string()
}

fn default_bucket() -> String {
    "3dpeople-digifabster-uploads".to_string()
}

fn default_prefix() -> String {
    "step/".to_string()
}

fn default_list_limit() -> usize {
    100
}

fn default_staging_dir() -> String {
    "/tmp".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_root() -> String {
    "./data/buckets".to_string()
}

fn default_page_size() -> usize {
    1000
}
