//! # meshbatch-pipeline
//!
//! The batch driver: list STEP objects, then (unless configured to stop
//! after listing) download, convert, and preview each one in turn and tile
//! the previews into a contact sheet.

pub mod pipeline;
pub mod report;

pub use pipeline::BatchPipeline;
pub use report::{JobReport, JobStatus, RunReport};
