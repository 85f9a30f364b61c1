//! # Core Module
//!
//! The analysis data model and the raster helpers every analyzer builds on.

pub mod image_ops;
pub mod types;

pub use types::{
    AnalysisResult, ColorFeatures, EngagementAssessment, EngagementCategory, FeatureSet,
    LineInsight, Rgb, StructureFeatures, TextResult, WordBox,
};
