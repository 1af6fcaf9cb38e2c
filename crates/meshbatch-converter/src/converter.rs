//! STEP → STL conversion facade.
//!
//! Every variant goes through the same sequence: validate the input, stage
//! a per-job scratch directory, generate the tool script, run the tool
//! under the caller's [`Deadline`], then verify the output. Failed or
//! timed-out attempts never leave a partial output file behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use meshbatch_core::config::conversion::{ConversionConfig, ToolOverrides};

use crate::deadline::Deadline;
use crate::error::ConversionError;
use crate::executor::{ExecutionParams, ExecutorError, ToolExecutor};
use crate::metrics::ConversionMetrics;
use crate::models::{ComparisonEntry, ConversionJob, ConversionOutcome, ToolAvailability};
use crate::scripting::ScriptingEngine;
use crate::variants::ConverterVariant;

/// Runs conversion jobs through the external tools.
#[derive(Debug, Clone)]
pub struct StepConverter {
    executor: ToolExecutor,
    /// Parent of the per-job scratch directories.
    work_root: PathBuf,
    tools: ToolOverrides,
    tolerance: f64,
    min_output_bytes: u64,
    timeout: Duration,
    metrics: Arc<ConversionMetrics>,
}

impl StepConverter {
    /// Create a converter from configuration.
    pub fn new(config: &ConversionConfig) -> Self {
        let work_root = config
            .work_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("meshbatch"));

        Self {
            executor: ToolExecutor::new(),
            work_root,
            tools: config.tools.clone(),
            tolerance: config.tessellation_tolerance,
            min_output_bytes: config.min_output_bytes,
            timeout: Duration::from_secs(config.timeout_seconds),
            metrics: Arc::new(ConversionMetrics::new()),
        }
    }

    /// The configured per-attempt budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A fresh deadline using the configured budget.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.timeout)
    }

    /// Metrics collected across every call on this converter.
    pub fn metrics(&self) -> &Arc<ConversionMetrics> {
        &self.metrics
    }

    /// Convert `job.input` into `job.output` with `job.variant`.
    pub async fn convert(
        &self,
        job: &ConversionJob,
        deadline: &Deadline,
    ) -> Result<ConversionOutcome, ConversionError> {
        if !tokio::fs::try_exists(&job.input).await? {
            return Err(ConversionError::InputMissing {
                path: job.input.clone(),
            });
        }

        // Tools run inside the scratch dir, so relative paths would break.
        let job = ConversionJob {
            input: std::path::absolute(&job.input)?,
            output: std::path::absolute(&job.output)?,
            variant: job.variant,
        };

        if let Some(parent) = job.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::try_exists(&job.output).await? {
            debug!(output = %job.output.display(), "Removing stale output before conversion");
            tokio::fs::remove_file(&job.output).await?;
        }

        let work_dir = self.work_root.join(Uuid::now_v7().simple().to_string());
        tokio::fs::create_dir_all(&work_dir).await?;

        self.metrics.record_started(job.variant);
        info!(
            variant = %job.variant,
            input = %job.input.display(),
            output = %job.output.display(),
            budget_s = deadline.budget().as_secs(),
            "Starting conversion"
        );

        let result = self.attempt(&job, deadline, &work_dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            warn!(work_dir = %work_dir.display(), error = %e, "Failed to clean up scratch directory");
        }

        self.metrics.record(job.variant, &result);
        match &result {
            Ok(outcome) => {
                info!(
                    variant = %job.variant,
                    elapsed_s = outcome.elapsed_seconds(),
                    output_bytes = outcome.output_bytes,
                    "Conversion finished"
                );
            }
            Err(e) => {
                Self::remove_partial_output(&job.output).await;
                if e.is_timeout() {
                    warn!(variant = %job.variant, input = %job.input.display(), "{e}");
                } else {
                    error!(variant = %job.variant, input = %job.input.display(), "{e}");
                }
            }
        }

        result
    }

    async fn attempt(
        &self,
        job: &ConversionJob,
        deadline: &Deadline,
        work_dir: &Path,
    ) -> Result<ConversionOutcome, ConversionError> {
        let started = Instant::now();
        let variant = job.variant;

        let script = ScriptingEngine::write_script(
            variant,
            &job.input,
            &job.output,
            self.tolerance,
            work_dir,
        )
        .await?;

        let params = ExecutionParams {
            command: variant.command(&self.tools),
            args: variant.args(&job.input, &job.output, script.as_deref()),
            working_dir: Some(work_dir.to_path_buf()),
        };

        self.executor
            .execute(&params, deadline)
            .await
            .map_err(|e| match e {
                ExecutorError::CommandNotFound(command) => {
                    ConversionError::ToolNotFound { variant, command }
                }
                ExecutorError::Timeout(budget) => ConversionError::Timeout {
                    variant,
                    timeout_seconds: budget.as_secs(),
                },
                ExecutorError::ProcessFailed { code, stderr } => ConversionError::ReadFailed {
                    variant,
                    code,
                    stderr,
                },
                ExecutorError::Killed => ConversionError::Killed { variant },
                ExecutorError::IoError(io) => ConversionError::Io(io),
            })?;

        let output_bytes = match tokio::fs::metadata(&job.output).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConversionError::OutputNotCreated {
                    path: job.output.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if output_bytes < self.min_output_bytes {
            return Err(ConversionError::OutputEmpty {
                path: job.output.clone(),
                bytes: output_bytes,
            });
        }

        Ok(ConversionOutcome {
            variant,
            output: job.output.clone(),
            output_bytes,
            elapsed: started.elapsed(),
        })
    }

    async fn remove_partial_output(output: &Path) {
        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!(output = %output.display(), "Removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(output = %output.display(), error = %e, "Failed to remove partial output"),
        }
    }

    /// Run every variant in `variants` on `input`, each under its own fresh
    /// deadline, writing `<stem>_<variant>.stl` files into `output_dir`.
    ///
    /// A failing variant is recorded and the comparison moves on.
    pub async fn compare(
        &self,
        input: &Path,
        output_dir: &Path,
        variants: &[ConverterVariant],
    ) -> Vec<ComparisonEntry> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");

        let mut entries = Vec::with_capacity(variants.len());
        for &variant in variants {
            let job = ConversionJob::new(
                input,
                output_dir.join(format!("{stem}_{variant}.stl")),
                variant,
            );
            let started = Instant::now();
            let result = self.convert(&job, &self.deadline()).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            entries.push(match result {
                Ok(outcome) => ComparisonEntry {
                    variant,
                    success: true,
                    timed_out: false,
                    elapsed_ms: outcome.elapsed.as_millis() as u64,
                    output: Some(outcome.output),
                    output_bytes: Some(outcome.output_bytes),
                    error: None,
                },
                Err(e) => ComparisonEntry {
                    variant,
                    success: false,
                    timed_out: e.is_timeout(),
                    elapsed_ms,
                    output: None,
                    output_bytes: None,
                    error: Some(e.to_string()),
                },
            });
        }
        entries
    }

    /// Report whether each variant's tool is installed.
    pub async fn check_tools(&self) -> Vec<ToolAvailability> {
        let mut results = Vec::with_capacity(ConverterVariant::ALL.len());
        for variant in ConverterVariant::ALL {
            let command = variant.command(&self.tools);
            let available = self.executor.check_command_available(&command).await;
            results.push(ToolAvailability {
                variant,
                command,
                available,
            });
        }
        results
    }
}
