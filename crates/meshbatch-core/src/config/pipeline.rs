//! Batch driver configuration.

use serde::{Deserialize, Serialize};

/// Settings for the sequential list → convert → render → composite driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stop after listing and reporting the object count.
    ///
    /// Defaults to `true`, which is how the batch job has always behaved;
    /// set to `false` to run the per-file conversion loop.
    #[serde(default = "default_list_only")]
    pub list_only: bool,
    /// Directory receiving converted meshes, previews, and the contact sheet.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// File name of the contact sheet written into `output_dir`.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            list_only: default_list_only(),
            output_dir: default_output_dir(),
            sheet_name: default_sheet_name(),
        }
    }
}

fn default_list_only() -> bool {
    true
}

fn default_output_dir() -> String {
    "./data/output".to_string()
}

fn default_sheet_name() -> String {
    "output.png".to_string()
}
