//! Unified error type for every converter variant.
//!
//! Each variant reports failure through the same `ConversionError` enum,
//! which maps cleanly to `meshbatch_core::error::AppError`.

use std::path::PathBuf;

use meshbatch_core::error::{AppError, ErrorKind};
use thiserror::Error;

use crate::variants::ConverterVariant;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Input file does not exist.
    #[error("Input file not found: {path}")]
    InputMissing {
        /// The missing input path.
        path: PathBuf,
    },

    /// Variant name not recognised.
    #[error("Unknown converter variant '{name}'")]
    UnknownVariant {
        /// The name that failed to parse.
        name: String,
    },

    /// The variant's tool is not installed or not on PATH.
    #[error("{variant}: tool '{command}' not found")]
    ToolNotFound {
        /// The variant whose tool is missing.
        variant: ConverterVariant,
        /// The command that could not be spawned.
        command: String,
    },

    /// The conversion did not finish before its deadline.
    #[error("{variant}: conversion timed out after {timeout_seconds}s")]
    Timeout {
        /// The variant that timed out.
        variant: ConverterVariant,
        /// The deadline budget in seconds.
        timeout_seconds: u64,
    },

    /// The tool exited non-zero, usually because the input is malformed or
    /// unreadable.
    #[error("{variant}: failed to read input (exit code {code}): {stderr}")]
    ReadFailed {
        /// The variant that failed.
        variant: ConverterVariant,
        /// The tool's exit code.
        code: i32,
        /// Captured stderr, truncated.
        stderr: String,
    },

    /// The tool was terminated by a signal.
    #[error("{variant}: tool was killed by a signal")]
    Killed {
        /// The variant whose tool was killed.
        variant: ConverterVariant,
    },

    /// Tool reported success but wrote nothing.
    #[error("Output file not created: {path}")]
    OutputNotCreated {
        /// Expected output path.
        path: PathBuf,
    },

    /// Output is smaller than the configured minimum.
    #[error("Output file too small ({bytes} bytes): {path}")]
    OutputEmpty {
        /// Path to the undersized output.
        path: PathBuf,
        /// Its size.
        bytes: u64,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Whether this is the timeout case.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        let kind = match &err {
            ConversionError::Timeout { .. } => ErrorKind::Timeout,
            ConversionError::InputMissing { .. } => ErrorKind::NotFound,
            ConversionError::UnknownVariant { .. } => ErrorKind::Validation,
            ConversionError::ToolNotFound { .. } => ErrorKind::Configuration,
            ConversionError::Io(_) => ErrorKind::Storage,
            _ => ErrorKind::Conversion,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
