//! Batch pipeline CLI command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use meshbatch_core::error::AppError;
use meshbatch_pipeline::{BatchPipeline, JobReport, JobStatus, RunReport};

/// Arguments for `run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Convert, render, and composite instead of stopping after listing
    #[arg(long, conflicts_with = "list_only")]
    pub full: bool,
    /// Stop after listing, whatever the configuration says
    #[arg(long)]
    pub list_only: bool,
    /// Override `storage.list_limit`
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Job row
#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    /// Object key
    key: String,
    /// Outcome
    status: String,
    /// Conversion time
    elapsed: String,
    /// Preview image
    preview: String,
    /// Error message
    error: String,
}

impl From<&JobReport> for JobRow {
    fn from(job: &JobReport) -> Self {
        Self {
            key: job.key.to_string(),
            status: serde_json::to_value(job.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            elapsed: format!("{:.2}s", job.elapsed_ms as f64 / 1000.0),
            preview: job
                .preview
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: job.error.clone().unwrap_or_default(),
        }
    }
}

/// Execute `run`
pub async fn execute(args: &RunArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;
    if args.full {
        config.pipeline.list_only = false;
    }
    if args.list_only {
        config.pipeline.list_only = true;
    }
    if let Some(limit) = args.limit {
        config.storage.list_limit = limit;
    }

    let store = super::open_store(&config).await?;
    let report = BatchPipeline::new(config, store)?.run().await?;

    match format {
        OutputFormat::Table => print_summary(&report),
        OutputFormat::Json => output::print_item(&report, format),
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Found {} objects", report.listed.len());
    if report.jobs.is_empty() {
        return;
    }

    let rows: Vec<JobRow> = report.jobs.iter().map(JobRow::from).collect();
    output::print_list(&rows, OutputFormat::Table);
    output::print_kv("Rendered", &report.count(JobStatus::Rendered).to_string());
    output::print_kv("Timed out", &report.count(JobStatus::TimedOut).to_string());
    output::print_kv(
        "Failed",
        &(report.count(JobStatus::ConversionFailed) + report.count(JobStatus::RenderFailed))
            .to_string(),
    );
    if !report.skipped.is_empty() {
        output::print_warning(&format!(
            "Skipped {} key(s) with no file name",
            report.skipped.len()
        ));
    }
    for tally in report.metrics.iter().flat_map(|m| &m.variants) {
        let mean = tally
            .mean_ms
            .map(|ms| format!("{:.2}s mean", ms as f64 / 1000.0))
            .unwrap_or_else(|| "no successes".to_string());
        output::print_kv(
            &tally.variant.to_string(),
            &format!("{}/{} converted, {mean}", tally.succeeded, tally.started),
        );
    }

    match &report.sheet {
        Some(sheet) => {
            if let Some(path) = &sheet.output {
                output::print_success(&format!("Contact sheet written to {}", path.display()));
            }
            if sheet.dropped > 0 {
                output::print_warning(&format!(
                    "{} preview(s) did not fit the contact sheet grid",
                    sheet.dropped
                ));
            }
        }
        None => output::print_warning("No previews rendered; contact sheet skipped"),
    }
}
