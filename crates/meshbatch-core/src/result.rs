//! Convenience result type alias for MeshBatch.

use crate::error::AppError;

/// A specialized `Result` type for MeshBatch operations.
pub type AppResult<T> = Result<T, AppError>;
