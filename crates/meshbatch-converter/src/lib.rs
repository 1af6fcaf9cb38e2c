//! # meshbatch-converter
//!
//! Converts STEP CAD files to STL meshes through one of five external
//! toolchains (Open CASCADE, FreeCAD, pyvista, assimp, a Python STEP
//! library). Every attempt runs as a child process bounded by a scoped
//! [`Deadline`]; on expiry the child is killed and any partial output is
//! removed. All variants share one error contract, [`ConversionError`].

pub mod converter;
pub mod deadline;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod models;
pub mod scripting;
pub mod variants;

pub use converter::StepConverter;
pub use deadline::{Deadline, DeadlineExceeded};
pub use error::ConversionError;
pub use metrics::{ConversionMetrics, MetricsSnapshot, VariantMetrics};
pub use models::{ComparisonEntry, ConversionJob, ConversionOutcome, ToolAvailability};
pub use variants::ConverterVariant;
