//! Sequential batch driver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use meshbatch_converter::{ConversionJob, ConverterVariant, StepConverter};
use meshbatch_core::config::AppConfig;
use meshbatch_core::error::AppError;
use meshbatch_core::result::AppResult;
use meshbatch_core::traits::object_store::ObjectStore;
use meshbatch_core::types::ObjectKey;
use meshbatch_render::{ContactSheet, PreviewRenderer};
use meshbatch_storage::{ObjectDownloader, ObjectLister};

use crate::report::{JobReport, JobStatus, RunReport};

/// Lists, converts, previews, and composites one batch.
#[derive(Debug)]
pub struct BatchPipeline {
    config: AppConfig,
    variant: ConverterVariant,
    lister: ObjectLister,
    downloader: ObjectDownloader,
    converter: StepConverter,
    renderer: PreviewRenderer,
    sheet: ContactSheet,
}

impl BatchPipeline {
    /// Wire a pipeline over `store` from configuration.
    pub fn new(config: AppConfig, store: Arc<dyn ObjectStore>) -> AppResult<Self> {
        let variant: ConverterVariant = config
            .conversion
            .default_variant
            .parse()
            .map_err(AppError::from)?;

        Ok(Self {
            variant,
            lister: ObjectLister::new(store.clone()),
            downloader: ObjectDownloader::new(store, &config.storage.staging_dir),
            converter: StepConverter::new(&config.conversion),
            renderer: PreviewRenderer::new(config.render.clone()),
            sheet: ContactSheet::from_config(&config.contact_sheet),
            config,
        })
    }

    /// The converter, for inspecting metrics after a run.
    pub fn converter(&self) -> &StepConverter {
        &self.converter
    }

    /// Run the batch.
    ///
    /// Listing and download errors abort the run. Conversion and render
    /// failures are recorded per job and the loop moves on.
    pub async fn run(&self) -> AppResult<RunReport> {
        let storage = &self.config.storage;
        let keys = self
            .lister
            .list(&storage.bucket, &storage.prefix, storage.list_limit)
            .await?;
        info!(
            bucket = %storage.bucket,
            prefix = %storage.prefix,
            count = keys.len(),
            "Found {} objects",
            keys.len()
        );

        if self.config.pipeline.list_only {
            info!("List-only run; skipping conversion");
            return Ok(RunReport::listed_only(keys));
        }

        let output_dir = PathBuf::from(&self.config.pipeline.output_dir);
        let mut jobs = Vec::with_capacity(keys.len());
        let mut skipped = Vec::new();
        for (index, key) in keys.iter().enumerate() {
            let Some(files) = JobFiles::new(index, key, &output_dir) else {
                warn!(key = %key, "Skipping key with no file name");
                skipped.push(key.clone());
                continue;
            };
            jobs.push(self.process(key, files).await?);
        }

        let previews: Vec<PathBuf> = jobs.iter().filter_map(|j| j.preview.clone()).collect();
        let sheet = if previews.is_empty() {
            warn!("No previews rendered; skipping contact sheet");
            None
        } else {
            let path = output_dir.join(&self.config.pipeline.sheet_name);
            Some(self.sheet.compose(&previews, &path).await?)
        };

        let report = RunReport {
            listed: keys,
            skipped,
            jobs,
            sheet,
            metrics: Some(self.converter.metrics().snapshot()),
        };
        info!(
            rendered = report.count(JobStatus::Rendered),
            skipped = report.skipped.len(),
            timed_out = report.count(JobStatus::TimedOut),
            failed = report.count(JobStatus::ConversionFailed),
            "Batch finished"
        );
        Ok(report)
    }

    async fn process(&self, key: &ObjectKey, files: JobFiles) -> AppResult<JobReport> {
        let JobFiles {
            staged,
            mesh,
            preview,
        } = files;
        let input = self
            .downloader
            .download(&self.config.storage.bucket, key.as_str(), &staged)
            .await?;

        let job = ConversionJob::new(&input, &mesh, self.variant);
        let deadline = self.converter.deadline();
        let outcome = match self.converter.convert(&job, &deadline).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let status = if e.is_timeout() {
                    warn!(key = %key, "Conversion timed out");
                    JobStatus::TimedOut
                } else {
                    error!(key = %key, error = %e, "Conversion failed");
                    JobStatus::ConversionFailed
                };
                return Ok(JobReport {
                    key: key.clone(),
                    status,
                    input,
                    mesh: None,
                    preview: None,
                    elapsed_ms: deadline.elapsed().as_millis() as u64,
                    error: Some(e.to_string()),
                });
            }
        };
        info!(
            key = %key,
            elapsed_s = outcome.elapsed_seconds(),
            "Conversion took {:.2} seconds",
            outcome.elapsed_seconds()
        );

        let elapsed_ms = outcome.elapsed.as_millis() as u64;
        match self.renderer.render(&outcome.output, &preview).await {
            Ok(()) => Ok(JobReport {
                key: key.clone(),
                status: JobStatus::Rendered,
                input,
                mesh: Some(outcome.output),
                preview: Some(preview),
                elapsed_ms,
                error: None,
            }),
            Err(e) => {
                error!(key = %key, error = %e, "Preview render failed");
                Ok(JobReport {
                    key: key.clone(),
                    status: JobStatus::RenderFailed,
                    input,
                    mesh: Some(outcome.output),
                    preview: None,
                    elapsed_ms,
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Local file names for one listed key.
///
/// Names carry the key's listing index so that keys sharing a file name
/// (`a/part.step`, `b/part.step`) or a stem (`part.step`, `part.stp`) never
/// overwrite each other's staged input, mesh, or preview.
#[derive(Debug, PartialEq, Eq)]
struct JobFiles {
    staged: String,
    mesh: PathBuf,
    preview: PathBuf,
}

impl JobFiles {
    /// `None` when the key has no file name, such as a `dir/` placeholder.
    fn new(index: usize, key: &ObjectKey, output_dir: &Path) -> Option<Self> {
        let name = key.file_name()?;
        let stem = key.file_stem().unwrap_or(name);
        Some(Self {
            staged: format!("{index:04}_{name}"),
            mesh: output_dir.join("meshes").join(format!("{index:04}_{stem}.stl")),
            preview: output_dir
                .join("previews")
                .join(format!("{index:04}_{stem}.png")),
        })
    }
}
