//! # meshbatch-storage
//!
//! Object store providers for MeshBatch, plus the paginating lister and the
//! single-object downloader built on top of them.

pub mod downloader;
pub mod lister;
pub mod manager;
pub mod providers;

pub use downloader::ObjectDownloader;
pub use lister::{DEFAULT_LIST_LIMIT, ObjectLister};
pub use manager::build_object_store;
