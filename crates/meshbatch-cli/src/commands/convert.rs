//! Conversion CLI commands.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use meshbatch_converter::{
    ComparisonEntry, ConversionJob, ConverterVariant, Deadline, StepConverter, ToolAvailability,
};
use meshbatch_core::error::AppError;

/// Arguments for `convert`
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// STEP input file
    pub input: PathBuf,
    /// STL output file
    pub output: PathBuf,
    /// Converter variant (defaults to `conversion.default_variant`)
    #[arg(short, long)]
    pub variant: Option<String>,
    /// Timeout in seconds, 1 to 3600 (defaults to `conversion.timeout_seconds`)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,
}

/// Arguments for `compare`
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// STEP input file
    pub input: PathBuf,
    /// Directory receiving one STL per variant
    #[arg(short, long, default_value = "./data/compare")]
    pub output_dir: PathBuf,
    /// Comma-separated variants (defaults to all)
    #[arg(long, value_delimiter = ',')]
    pub variants: Vec<String>,
}

/// Comparison row
#[derive(Debug, Serialize, Tabled)]
struct ComparisonRow {
    /// Variant
    variant: String,
    /// Result
    result: String,
    /// Elapsed
    elapsed: String,
    /// Output size
    size: String,
    /// Error message
    error: String,
}

impl From<&ComparisonEntry> for ComparisonRow {
    fn from(entry: &ComparisonEntry) -> Self {
        let result = match (entry.success, entry.timed_out) {
            (true, _) => "ok",
            (false, true) => "timeout",
            (false, false) => "failed",
        };
        Self {
            variant: entry.variant.to_string(),
            result: result.to_string(),
            elapsed: format!("{:.2}s", entry.elapsed_ms as f64 / 1000.0),
            size: entry
                .output_bytes
                .map(output::format_bytes)
                .unwrap_or_default(),
            error: entry.error.clone().unwrap_or_default(),
        }
    }
}

/// Tool availability row
#[derive(Debug, Serialize, Tabled)]
struct ToolRow {
    /// Variant
    variant: String,
    /// Command
    command: String,
    /// Installed
    available: String,
}

impl From<&ToolAvailability> for ToolRow {
    fn from(tool: &ToolAvailability) -> Self {
        Self {
            variant: tool.variant.to_string(),
            command: tool.command.clone(),
            available: if tool.available { "✓" } else { "✗" }.to_string(),
        }
    }
}

/// Execute `convert`
pub async fn convert(
    args: &ConvertArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let variant: ConverterVariant = args
        .variant
        .as_deref()
        .unwrap_or(&config.conversion.default_variant)
        .parse()?;

    let converter = StepConverter::new(&config.conversion);
    let deadline = match args.timeout {
        Some(seconds) => Deadline::after_secs(seconds),
        None => converter.deadline(),
    };

    let job = ConversionJob::new(&args.input, &args.output, variant);
    let outcome = converter.convert(&job, &deadline).await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "Conversion took {:.2} seconds",
                outcome.elapsed_seconds()
            ));
            output::print_kv("Variant", variant.name());
            output::print_kv("Output", &outcome.output.display().to_string());
            output::print_kv("Size", &output::format_bytes(outcome.output_bytes));
        }
        OutputFormat::Json => output::print_item(&outcome, format),
    }
    Ok(())
}

/// Execute `compare`
pub async fn compare(
    args: &CompareArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let variants = parse_variants(&args.variants)?;

    let converter = StepConverter::new(&config.conversion);
    let entries = converter
        .compare(&args.input, &args.output_dir, &variants)
        .await;

    match format {
        OutputFormat::Table => {
            let rows: Vec<ComparisonRow> = entries.iter().map(ComparisonRow::from).collect();
            output::print_list(&rows, format);
        }
        OutputFormat::Json => output::print_item(&entries, format),
    }

    if entries.iter().all(|e| !e.success) {
        output::print_warning("No variant produced an output");
    }
    Ok(())
}

/// Execute `tools`
pub async fn tools(env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let converter = StepConverter::new(&config.conversion);
    let tools = converter.check_tools().await;

    match format {
        OutputFormat::Table => {
            let rows: Vec<ToolRow> = tools.iter().map(ToolRow::from).collect();
            output::print_list(&rows, format);
        }
        OutputFormat::Json => output::print_item(&tools, format),
    }
    Ok(())
}

/// Parse variant names; an empty list means every variant.
fn parse_variants(names: &[String]) -> Result<Vec<ConverterVariant>, AppError> {
    if names.is_empty() {
        return Ok(ConverterVariant::ALL.to_vec());
    }
    names
        .iter()
        .map(|n| n.trim().parse::<ConverterVariant>().map_err(AppError::from))
        .collect()
}
