//! Object store CLI commands.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use meshbatch_core::error::AppError;
use meshbatch_core::types::ObjectKey;
use meshbatch_storage::{ObjectDownloader, ObjectLister};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Bucket to list (defaults to `storage.bucket`)
    #[arg(short, long)]
    pub bucket: Option<String>,
    /// Key prefix (defaults to `storage.prefix`)
    #[arg(short, long)]
    pub prefix: Option<String>,
    /// Maximum number of keys (defaults to `storage.list_limit`)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for `download`
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Object key
    pub key: String,
    /// Bucket (defaults to `storage.bucket`)
    #[arg(short, long)]
    pub bucket: Option<String>,
    /// Local file name (defaults to the key's last segment)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Listed key row
#[derive(Debug, Serialize, Tabled)]
struct KeyRow {
    /// Position in listing order
    #[tabled(rename = "#")]
    index: usize,
    /// Object key
    key: String,
    /// File name
    name: String,
}

/// Download result
#[derive(Debug, Serialize)]
struct DownloadResult {
    bucket: String,
    key: String,
    path: PathBuf,
}

/// Execute `list`
pub async fn list(args: &ListArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let store = super::open_store(&config).await?;

    let bucket = args.bucket.as_deref().unwrap_or(&config.storage.bucket);
    let prefix = args.prefix.as_deref().unwrap_or(&config.storage.prefix);
    let limit = args.limit.unwrap_or(config.storage.list_limit);

    let keys = ObjectLister::new(store).list(bucket, prefix, limit).await?;

    let rows: Vec<KeyRow> = keys
        .iter()
        .enumerate()
        .map(|(index, key)| KeyRow {
            index: index + 1,
            key: key.to_string(),
            name: key.file_name().unwrap_or_default().to_string(),
        })
        .collect();

    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        println!("Found {} objects", rows.len());
    }
    Ok(())
}

/// Execute `download`
pub async fn download(
    args: &DownloadArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let store = super::open_store(&config).await?;
    let downloader = ObjectDownloader::new(store, &config.storage.staging_dir);

    let bucket = args.bucket.as_deref().unwrap_or(&config.storage.bucket);
    let key = ObjectKey::new(args.key.as_str());

    let path = match &args.name {
        Some(name) => downloader.download(bucket, key.as_str(), name).await?,
        None => downloader.download_key(bucket, &key).await?,
    };

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Downloaded {bucket}/{key}"));
            output::print_kv("Path", &path.display().to_string());
        }
        OutputFormat::Json => output::print_item(
            &DownloadResult {
                bucket: bucket.to_string(),
                key: key.to_string(),
                path,
            },
            format,
        ),
    }
    Ok(())
}
