//! Script generation for script-driven converter variants.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::ConversionError;
use crate::variants::{ConverterVariant, ScriptKind};

/// Generates the Tcl/Python scripts the conversion tools execute.
pub struct ScriptingEngine;

impl ScriptingEngine {
    /// Write the script for `variant` into `work_dir`.
    ///
    /// Returns `None` for variants driven purely by arguments.
    pub async fn write_script(
        variant: ConverterVariant,
        input: &Path,
        output: &Path,
        tolerance: f64,
        work_dir: &Path,
    ) -> Result<Option<PathBuf>, ConversionError> {
        let Some(kind) = variant.script_kind() else {
            return Ok(None);
        };

        let content = Self::script_content(variant, input, output, tolerance);
        let script_path = work_dir.join(format!("convert_{}.{}", variant.name(), kind.extension()));

        let mut file = tokio::fs::File::create(&script_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(Some(script_path))
    }

    /// Script body for `variant`; empty for scriptless variants.
    pub fn script_content(
        variant: ConverterVariant,
        input: &Path,
        output: &Path,
        tolerance: f64,
    ) -> String {
        match variant {
            ConverterVariant::Occt => {
                let input = tcl_quote(input);
                let output = tcl_quote(output);
                [
                    "pload MODELING XDE".to_string(),
                    format!("testreadstep {input} shape"),
                    format!("incmesh shape {tolerance}"),
                    format!("writestl shape {output}"),
                    "exit".to_string(),
                ]
                .join("\n")
            }
            ConverterVariant::FreeCad => {
                let input = py_quote(input);
                let output = py_quote(output);
                [
                    "import FreeCAD".to_string(),
                    "import Part".to_string(),
                    "import Mesh".to_string(),
                    "shape = Part.Shape()".to_string(),
                    format!("shape.read({input})"),
                    format!("mesh = Mesh.Mesh(shape.tessellate({tolerance}))"),
                    format!("mesh.write({output})"),
                ]
                .join("\n")
            }
            ConverterVariant::PyVista => {
                let input = py_quote(input);
                let output = py_quote(output);
                [
                    "import pyvista".to_string(),
                    format!("mesh = pyvista.read({input})"),
                    format!("mesh.save({output})"),
                ]
                .join("\n")
            }
            ConverterVariant::StepLib => {
                let input = py_quote(input);
                let output = py_quote(output);
                [
                    "import pystep".to_string(),
                    format!("model = pystep.read({input})"),
                    format!("pystep.write(model, {output}, file_format=\"stl\")"),
                ]
                .join("\n")
            }
            ConverterVariant::Assimp => String::new(),
        }
    }
}

/// A Python string literal for `path`. JSON string escapes are valid Python.
fn py_quote(path: &Path) -> String {
    serde_json::Value::String(path.to_string_lossy().to_string()).to_string()
}

/// A brace-quoted Tcl word for `path`.
fn tcl_quote(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    format!("{{{raw}}}")
}
