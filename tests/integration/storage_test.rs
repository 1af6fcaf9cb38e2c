//! Integration tests for listing and downloading through the configured store.

mod helpers;

use meshbatch_core::error::ErrorKind;
use meshbatch_core::types::ObjectKey;
use meshbatch_storage::{ObjectDownloader, ObjectLister};

use helpers::{BUCKET, Fixture};

#[tokio::test]
async fn test_lister_follows_markers_across_pages() {
    let fx = Fixture::new();
    let keys: Vec<String> = (0..7).map(|i| format!("step/part_{i:02}.step")).collect();
    for key in &keys {
        fx.seed(key, "ISO-10303-21;");
    }
    let config = fx.config();
    let lister = ObjectLister::new(fx.store(&config).await);

    // Page size 2, so seven keys take four pages.
    let all = lister.list(BUCKET, "step/", 100).await.expect("list");
    let listed: Vec<&str> = all.iter().map(ObjectKey::as_str).collect();
    assert_eq!(listed, keys.iter().map(String::as_str).collect::<Vec<_>>());

    let limited = lister.list(BUCKET, "step/", 3).await.expect("list");
    assert_eq!(limited.len(), 3);
    assert_eq!(limited[2].as_str(), "step/part_02.step");
}

#[tokio::test]
async fn test_lister_empty_prefix_returns_nothing() {
    let fx = Fixture::new();
    fx.seed("step/a.step", "x");
    let config = fx.config();
    let lister = ObjectLister::new(fx.store(&config).await);

    let keys = lister.list(BUCKET, "nothing/", 100).await.expect("list");
    assert!(keys.is_empty());
}

#[tokio::test]
async fn test_download_listed_key_to_staging() {
    let fx = Fixture::new();
    fx.seed("step/nested/bracket.step", "ISO-10303-21;\nDATA;\n");
    let config = fx.config();
    let store = fx.store(&config).await;

    let keys = ObjectLister::new(store.clone())
        .list(BUCKET, "step/", 10)
        .await
        .expect("list");
    let downloader = ObjectDownloader::new(store, fx.staging_dir());
    let path = downloader
        .download_key(BUCKET, &keys[0])
        .await
        .expect("download");

    assert_eq!(path, fx.staging_dir().join("bracket.step"));
    assert_eq!(
        std::fs::read_to_string(path).expect("read"),
        "ISO-10303-21;\nDATA;\n"
    );
}

#[tokio::test]
async fn test_download_missing_key_not_found() {
    let fx = Fixture::new();
    let config = fx.config();
    let downloader = ObjectDownloader::new(fx.store(&config).await, fx.staging_dir());

    let err = downloader
        .download(BUCKET, "step/ghost.step", "ghost.step")
        .await
        .expect_err("missing");
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_unknown_provider_rejected() {
    let fx = Fixture::new();
    let mut config = fx.config();
    config.storage.provider = "ftp".to_string();

    let err = meshbatch_storage::build_object_store(&config.storage)
        .await
        .expect_err("unknown provider");
    assert!(err.is(ErrorKind::Configuration));
}
