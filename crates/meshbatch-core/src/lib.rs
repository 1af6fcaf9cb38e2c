//! # meshbatch-core
//!
//! Core crate for MeshBatch. Contains the object-store trait, configuration
//! schemas, object key types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MeshBatch crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
