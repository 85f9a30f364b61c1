//! Visual feature analyzers.

pub mod color;
pub mod kmeans;
pub mod structure;

pub use color::ColorAnalyzer;
pub use structure::StructureAnalyzer;
