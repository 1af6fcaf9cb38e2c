//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file is a
//! valid configuration.

pub mod conversion;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod storage;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::conversion::ConversionConfig;
use self::logging::LoggingConfig;
use self::pipeline::PipelineConfig;
use self::render::{ContactSheetConfig, RenderConfig};
use self::storage::StorageConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides (`MESHBATCH__STORAGE__BUCKET=...`).
pub const ENV_PREFIX: &str = "MESHBATCH";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Object store settings.
    pub storage: StorageConfig,
    /// Format conversion settings.
    pub conversion: ConversionConfig,
    /// Preview renderer settings.
    pub render: RenderConfig,
    /// Contact-sheet compositor settings.
    pub contact_sheet: ContactSheetConfig,
    /// Batch driver settings.
    pub pipeline: PipelineConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `MESHBATCH__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single TOML file, without overlays.
    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section that carries constraints.
    pub fn validate(&self) -> Result<(), AppError> {
        self.conversion.validate()?;
        self.render.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
