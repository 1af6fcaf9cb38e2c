//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use meshbatch_core::config::AppConfig;
use meshbatch_core::traits::object_store::ObjectStore;
use meshbatch_storage::build_object_store;

/// Bucket every fixture seeds.
pub const BUCKET: &str = "uploads";

/// A small ASCII STL the fake tools emit: one triangle near the origin.
pub const TRIANGLE_STL: &str = "solid part
facet normal 0 0 1
outer loop
vertex -0.2 -0.2 0
vertex 0.2 -0.2 0
vertex 0 0.2 0
endloop
endfacet
endsolid part
";

/// Scratch workspace with a directory-backed object store.
pub struct Fixture {
    /// Root of everything the test writes.
    pub temp: tempfile::TempDir,
}

impl Fixture {
    /// Create an empty fixture.
    pub fn new() -> Self {
        Self {
            temp: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Root of the local object store.
    pub fn store_root(&self) -> PathBuf {
        self.temp.path().join("buckets")
    }

    /// Where the pipeline writes meshes, previews, and the sheet.
    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("output")
    }

    /// Where downloads land.
    pub fn staging_dir(&self) -> PathBuf {
        self.temp.path().join("staging")
    }

    /// Store `contents` under `key` in [`BUCKET`].
    pub fn seed(&self, key: &str, contents: &str) {
        let path = self.store_root().join(BUCKET).join(key);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("seed object");
    }

    /// Store a placeholder STEP file under each key.
    pub fn seed_step_files(&self, keys: &[&str]) {
        for key in keys {
            self.seed(key, "ISO-10303-21;\nEND-ISO-10303-21;\n");
        }
    }

    /// Configuration pointing every directory inside the fixture.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.provider = "local".to_string();
        config.storage.bucket = BUCKET.to_string();
        config.storage.prefix = "step/".to_string();
        config.storage.staging_dir = path_string(&self.staging_dir());
        config.storage.local.root_path = path_string(&self.store_root());
        config.storage.local.page_size = 2;
        config.conversion.work_dir = Some(path_string(&self.temp.path().join("work")));
        config.render.width = 64;
        config.render.height = 48;
        config.contact_sheet.labels = false;
        config.pipeline.output_dir = path_string(&self.output_dir());
        config
    }

    /// Build the store the configuration describes.
    pub async fn store(&self, config: &AppConfig) -> Arc<dyn ObjectStore> {
        std::fs::create_dir_all(self.store_root().join(BUCKET)).expect("bucket dir");
        build_object_store(&config.storage).await.expect("store")
    }

    /// Write an executable shell script standing in for a conversion tool.
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = self.temp.path().join("bin").join(name);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write tool");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path_string(&path)
    }

    /// A fake `assimp export <in> <out> -fstl` that writes [`TRIANGLE_STL`],
    /// fails on inputs named `*bad*`, and hangs on inputs named `*slow*`.
    #[cfg(unix)]
    pub fn fake_assimp(&self) -> String {
        let body = format!(
            "case \"$2\" in\n  *bad*) echo 'ERROR: cannot read STEP' >&2; exit 1 ;;\n  *slow*) exec sleep 10 ;;\nesac\ncat > \"$3\" <<'STL'\n{TRIANGLE_STL}STL"
        );
        self.fake_tool("assimp", &body)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
