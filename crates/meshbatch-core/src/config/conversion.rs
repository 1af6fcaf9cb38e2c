//! Format conversion configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for the STEP → STL converter variants.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConversionConfig {
    /// Wall-clock deadline for a single conversion attempt.
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 3600))]
    pub timeout_seconds: u64,
    /// Variant used by the batch driver (`occt`, `freecad`, `pyvista`,
    /// `assimp`, `steplib`).
    #[serde(default = "default_variant")]
    pub default_variant: String,
    /// Scratch directory for generated tool scripts. Defaults to the
    /// system temp directory.
    #[serde(default)]
    pub work_dir: Option<String>,
    /// Minimum output size (bytes) for a conversion to count as successful.
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: u64,
    /// Linear deflection used when tessellating B-rep shapes.
    #[serde(default = "default_tessellation_tolerance")]
    #[validate(range(exclusive_min = 0.0))]
    pub tessellation_tolerance: f64,
    /// Per-variant tool command overrides.
    #[serde(default)]
    pub tools: ToolOverrides,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            default_variant: default_variant(),
            work_dir: None,
            min_output_bytes: default_min_output_bytes(),
            tessellation_tolerance: default_tessellation_tolerance(),
            tools: ToolOverrides::default(),
        }
    }
}

/// Executable overrides for each converter variant.
///
/// `None` keeps the variant's stock command (`DRAWEXE`, `freecadcmd`,
/// `python3`, `assimp`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolOverrides {
    /// Open CASCADE Draw harness.
    #[serde(default)]
    pub occt: Option<String>,
    /// FreeCAD headless command.
    #[serde(default)]
    pub freecad: Option<String>,
    /// Python interpreter with pyvista installed.
    #[serde(default)]
    pub pyvista: Option<String>,
    /// Assimp command-line tool.
    #[serde(default)]
    pub assimp: Option<String>,
    /// Python interpreter with the STEP library installed.
    #[serde(default)]
    pub steplib: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_variant() -> String {
    "occt".to_string()
}

fn default_min_output_bytes() -> u64 {
    1
}

fn default_tessellation_tolerance() -> f64 {
    0.1
}
