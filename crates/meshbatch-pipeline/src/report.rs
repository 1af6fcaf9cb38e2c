//! Run reports.

use std::path::PathBuf;

use serde::Serialize;

use meshbatch_converter::MetricsSnapshot;
use meshbatch_core::result::AppResult;
use meshbatch_core::types::ObjectKey;
use meshbatch_render::SheetSummary;

/// Final state of one listed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Converted and previewed.
    Rendered,
    /// Converted, but the preview failed.
    RenderFailed,
    /// The converter ran out of time.
    TimedOut,
    /// The converter failed for any other reason.
    ConversionFailed,
}

impl JobStatus {
    /// Whether an STL was produced.
    pub fn converted(self) -> bool {
        matches!(self, Self::Rendered | Self::RenderFailed)
    }
}

/// What happened to one object.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Source object.
    pub key: ObjectKey,
    /// Outcome.
    pub status: JobStatus,
    /// Local copy of the STEP file.
    pub input: PathBuf,
    /// Converted mesh, when conversion succeeded.
    pub mesh: Option<PathBuf>,
    /// Preview image, when rendering succeeded.
    pub preview: Option<PathBuf>,
    /// Conversion time in milliseconds.
    pub elapsed_ms: u64,
    /// Failure message.
    pub error: Option<String>,
}

/// Everything a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Keys returned by the listing, in order.
    pub listed: Vec<ObjectKey>,
    /// Listed keys with no file name (directory placeholders), not processed.
    pub skipped: Vec<ObjectKey>,
    /// Per-object results; empty for list-only runs.
    pub jobs: Vec<JobReport>,
    /// The composed contact sheet, if any previews were produced.
    pub sheet: Option<SheetSummary>,
    /// Converter counters for the run.
    pub metrics: Option<MetricsSnapshot>,
}

impl RunReport {
    /// A report for a run that stopped after listing.
    pub fn listed_only(listed: Vec<ObjectKey>) -> Self {
        Self {
            listed,
            skipped: Vec::new(),
            jobs: Vec::new(),
            sheet: None,
            metrics: None,
        }
    }

    /// Number of jobs with the given status.
    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_only_report_serializes() {
        let report = RunReport::listed_only(vec![ObjectKey::new("step/a.step")]);
        let json = report.to_json().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["listed"][0], "step/a.step");
        assert!(value["jobs"].as_array().expect("jobs").is_empty());
        assert!(value["sheet"].is_null());
    }

    #[test]
    fn test_status_counts() {
        let job = |status| JobReport {
            key: ObjectKey::new("k.step"),
            status,
            input: PathBuf::from("/tmp/k.step"),
            mesh: None,
            preview: None,
            elapsed_ms: 0,
            error: None,
        };
        let report = RunReport {
            listed: Vec::new(),
            skipped: Vec::new(),
            jobs: vec![
                job(JobStatus::Rendered),
                job(JobStatus::TimedOut),
                job(JobStatus::Rendered),
            ],
            sheet: None,
            metrics: None,
        };

        assert_eq!(report.count(JobStatus::Rendered), 2);
        assert_eq!(report.count(JobStatus::TimedOut), 1);
        assert!(JobStatus::RenderFailed.converted());
        assert!(!JobStatus::ConversionFailed.converted());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::ConversionFailed).expect("json");
        assert_eq!(json, "\"conversion_failed\"");
    }
}
