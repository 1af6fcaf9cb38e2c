//! Data models for conversion jobs and their results.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::variants::ConverterVariant;

/// One conversion attempt: input, output, and the backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Source STEP file.
    pub input: PathBuf,
    /// Destination STL file.
    pub output: PathBuf,
    /// Backend to convert with.
    pub variant: ConverterVariant,
}

impl ConversionJob {
    /// Build a job.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        variant: ConverterVariant,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            variant,
        }
    }
}

/// A successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Backend that produced the output.
    pub variant: ConverterVariant,
    /// Path of the written STL.
    pub output: PathBuf,
    /// Size of the written STL.
    pub output_bytes: u64,
    /// Wall-clock time of the attempt.
    pub elapsed: Duration,
}

impl ConversionOutcome {
    /// Elapsed wall-clock seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// One row of a variant comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Backend tried.
    pub variant: ConverterVariant,
    /// Whether it produced a valid output.
    pub success: bool,
    /// Whether the failure was a timeout.
    pub timed_out: bool,
    /// Wall-clock time of the attempt in milliseconds.
    pub elapsed_ms: u64,
    /// Output path on success.
    pub output: Option<PathBuf>,
    /// Output size on success.
    pub output_bytes: Option<u64>,
    /// Error message on failure.
    pub error: Option<String>,
}

/// Whether a variant's tool resolves on this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAvailability {
    /// The variant.
    pub variant: ConverterVariant,
    /// The command it would run.
    pub command: String,
    /// Whether the command is available.
    pub available: bool,
}
