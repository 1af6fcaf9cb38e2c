//! CLI command definitions and dispatch.

pub mod config;
pub mod convert;
pub mod render;
pub mod run;
pub mod storage;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use meshbatch_core::config::AppConfig;
use meshbatch_core::error::AppError;
use meshbatch_core::traits::object_store::ObjectStore;

/// MeshBatch: STEP to STL batch conversion, previews, and contact sheets
#[derive(Debug, Parser)]
#[command(name = "meshbatch-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List object keys under a prefix
    List(storage::ListArgs),
    /// Download one object into the staging directory
    Download(storage::DownloadArgs),
    /// Convert a STEP file to STL with one variant
    Convert(convert::ConvertArgs),
    /// Run several variants on one STEP file and compare them
    Compare(convert::CompareArgs),
    /// Check which conversion tools are installed
    Tools,
    /// Render an STL preview image
    Render(render::RenderArgs),
    /// Tile images into a labelled contact sheet
    Sheet(render::SheetArgs),
    /// Run the batch pipeline
    Run(run::RunArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let format = self.format;
        match &self.command {
            Commands::List(args) => storage::list(args, &self.env, format).await,
            Commands::Download(args) => storage::download(args, &self.env, format).await,
            Commands::Convert(args) => convert::convert(args, &self.env, format).await,
            Commands::Compare(args) => convert::compare(args, &self.env, format).await,
            Commands::Tools => convert::tools(&self.env, format).await,
            Commands::Render(args) => render::render(args, &self.env).await,
            Commands::Sheet(args) => render::sheet(args, &self.env, format).await,
            Commands::Run(args) => run::execute(args, &self.env, format).await,
            Commands::Config(args) => config::execute(args, &self.env, format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(env)?;
    tracing::debug!(env, provider = %config.storage.provider, "Loaded configuration");
    Ok(config)
}

/// Helper: build the configured object store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ObjectStore>, AppError> {
    meshbatch_storage::build_object_store(&config.storage).await
}
