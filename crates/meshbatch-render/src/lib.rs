//! # meshbatch-render
//!
//! Turns converted meshes into pictures: a fixed-viewport flat-shaded
//! preview per STL file, and a labelled contact sheet tiling those previews.

pub mod contact_sheet;
pub mod mesh;
pub mod preview;

pub use contact_sheet::{ContactSheet, ImageGrid, LabelStyle, SheetSummary};
pub use mesh::TriangleMesh;
pub use preview::PreviewRenderer;
