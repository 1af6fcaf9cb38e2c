//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use meshbatch_core::config::AppConfig;
use meshbatch_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = masked(super::load_config(env)?);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(env) {
            Ok(config) => {
                output::print_success(&format!("Configuration for '{env}' is valid"));
                output::print_kv("Storage", &config.storage.provider);
                output::print_kv(
                    "Source",
                    &format!("{}/{}", config.storage.bucket, config.storage.prefix),
                );
                output::print_kv("Default variant", &config.conversion.default_variant);
                output::print_kv(
                    "Timeout",
                    &format!("{}s", config.conversion.timeout_seconds),
                );
                output::print_kv("List only", &config.pipeline.list_only.to_string());
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Hide credentials before printing.
fn masked(mut config: AppConfig) -> AppConfig {
    let s3 = &mut config.storage.s3;
    if !s3.secret_key.is_empty() {
        s3.secret_key = "****".to_string();
    }
    if s3.access_key.chars().count() > 4 {
        let visible: String = s3.access_key.chars().take(4).collect();
        s3.access_key = format!("{visible}****");
    }
    config
}
