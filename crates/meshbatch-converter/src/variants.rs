//! Converter variants and the external tool each one drives.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use meshbatch_core::config::conversion::ToolOverrides;

use crate::error::ConversionError;

/// The five interchangeable-in-shape (not in fidelity) STEP → STL backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterVariant {
    /// Open CASCADE XDE reader and STL writer via the Draw harness.
    Occt,
    /// FreeCAD part reader, tessellated into a FreeCAD mesh.
    FreeCad,
    /// pyvista reader/writer.
    PyVista,
    /// Open Asset Import Library command-line exporter.
    Assimp,
    /// Python STEP library reader with STL export.
    StepLib,
}

/// Script language a variant's tool consumes, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Draw harness Tcl.
    Tcl,
    /// Python.
    Python,
}

impl ScriptKind {
    /// File extension for generated scripts.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tcl => "tcl",
            Self::Python => "py",
        }
    }
}

impl ConverterVariant {
    /// Every variant, in comparison order.
    pub const ALL: [ConverterVariant; 5] = [
        Self::Occt,
        Self::FreeCad,
        Self::PyVista,
        Self::Assimp,
        Self::StepLib,
    ];

    /// Lowercase identifier used in config and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Occt => "occt",
            Self::FreeCad => "freecad",
            Self::PyVista => "pyvista",
            Self::Assimp => "assimp",
            Self::StepLib => "steplib",
        }
    }

    /// Executable invoked when no override is configured.
    pub fn default_command(self) -> &'static str {
        match self {
            Self::Occt => "DRAWEXE",
            Self::FreeCad => "freecadcmd",
            Self::PyVista | Self::StepLib => "python3",
            Self::Assimp => "assimp",
        }
    }

    /// The configured command, falling back to [`Self::default_command`].
    pub fn command(self, overrides: &ToolOverrides) -> String {
        let configured = match self {
            Self::Occt => &overrides.occt,
            Self::FreeCad => &overrides.freecad,
            Self::PyVista => &overrides.pyvista,
            Self::Assimp => &overrides.assimp,
            Self::StepLib => &overrides.steplib,
        };
        configured
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.default_command())
            .to_string()
    }

    /// Script the tool reads, if the variant is script-driven.
    pub fn script_kind(self) -> Option<ScriptKind> {
        match self {
            Self::Occt => Some(ScriptKind::Tcl),
            Self::FreeCad | Self::PyVista | Self::StepLib => Some(ScriptKind::Python),
            Self::Assimp => None,
        }
    }

    /// Argument template with `{input}`, `{output}`, `{script}` placeholders.
    pub fn args_template(self) -> &'static [&'static str] {
        match self {
            Self::Occt => &["-b", "-f", "{script}"],
            Self::FreeCad | Self::PyVista | Self::StepLib => &["{script}"],
            Self::Assimp => &["export", "{input}", "{output}", "-fstl"],
        }
    }

    /// Expand the argument template for one job.
    pub fn args(self, input: &Path, output: &Path, script: Option<&Path>) -> Vec<String> {
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();
        let script_str = script
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        self.args_template()
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input_str)
                    .replace("{output}", &output_str)
                    .replace("{script}", &script_str)
            })
            .collect()
    }
}

impl fmt::Display for ConverterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConverterVariant {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "occt" | "opencascade" => Ok(Self::Occt),
            "freecad" => Ok(Self::FreeCad),
            "pyvista" => Ok(Self::PyVista),
            "assimp" => Ok(Self::Assimp),
            "steplib" | "pystep" => Ok(Self::StepLib),
            _ => Err(ConversionError::UnknownVariant {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_roundtrip() {
        for variant in ConverterVariant::ALL {
            let parsed: ConverterVariant = variant.name().parse().expect("parse");
            assert_eq!(parsed, variant);
        }
        assert_eq!(
            "PyStep".parse::<ConverterVariant>().expect("alias"),
            ConverterVariant::StepLib
        );
    }

    #[test]
    fn test_unknown_variant() {
        let err = "meshlab".parse::<ConverterVariant>().expect_err("unknown");
        assert!(matches!(err, ConversionError::UnknownVariant { .. }));
    }

    #[test]
    fn test_override_replaces_command() {
        let overrides = ToolOverrides {
            assimp: Some("/opt/assimp/bin/assimp".to_string()),
            freecad: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ConverterVariant::Assimp.command(&overrides),
            "/opt/assimp/bin/assimp"
        );
        assert_eq!(ConverterVariant::FreeCad.command(&overrides), "freecadcmd");
        assert_eq!(ConverterVariant::Occt.command(&overrides), "DRAWEXE");
    }

    #[test]
    fn test_assimp_args_substitute_paths() {
        let args = ConverterVariant::Assimp.args(
            Path::new("/in/part.step"),
            Path::new("/out/part.stl"),
            None,
        );
        assert_eq!(args, vec!["export", "/in/part.step", "/out/part.stl", "-fstl"]);
    }

    #[test]
    fn test_occt_args_point_at_script() {
        let args = ConverterVariant::Occt.args(
            Path::new("/in/part.step"),
            Path::new("/out/part.stl"),
            Some(Path::new("/work/job.tcl")),
        );
        assert_eq!(args, vec!["-b", "-f", "/work/job.tcl"]);
    }

    #[test]
    fn test_only_assimp_is_scriptless() {
        for variant in ConverterVariant::ALL {
            assert_eq!(
                variant.script_kind().is_none(),
                variant == ConverterVariant::Assimp
            );
        }
    }
}
