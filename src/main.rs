//! MeshBatch batch job.
//!
//! Loads configuration, lists STEP objects from the configured store, and
//! (unless `pipeline.list_only` is set) converts, previews, and composites
//! them. The run report is printed to stdout as JSON.

use tracing_subscriber::{EnvFilter, fmt};

use meshbatch_core::config::AppConfig;
use meshbatch_core::error::AppError;
use meshbatch_pipeline::BatchPipeline;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Batch failed: {e}");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `MESHBATCH_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MESHBATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        provider = %config.storage.provider,
        list_only = config.pipeline.list_only,
        "Starting MeshBatch v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = meshbatch_storage::build_object_store(&config.storage).await?;
    let report = BatchPipeline::new(config, store)?.run().await?;

    println!("{}", report.to_json()?);
    Ok(())
}
