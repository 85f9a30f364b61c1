//! # Social-Media Post Insight Library
//!
//! Computes visual and textual quality metrics for a single social-media
//! image and turns them into a heuristic engagement assessment with ordered
//! recommendations.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `analysis`: Color and structure analyzers (k-means, Canny, Otsu, SSIM)
//! - `text`: OCR collaborator trait, the OCR.space client and text signals
//! - `scoring`: Engagement profiles and the recommendation engine
//! - `pipeline`: Orchestration of one analysis call
//! - `core`: Data model and raster helpers
//! - `config`: Thresholds, working sizes and OCR settings
//!
//! ## Features
//!
//! - **Deterministic metrics**: every numeric feature is a pure function of the
//!   input bytes; color clustering is seeded
//! - **Graceful OCR degradation**: collaborator failures become empty text and
//!   a warning, never a failed analysis
//! - **Async/await**: built on Tokio; pixel work runs on the blocking pool
//!   while the OCR request is in flight
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sosmed_insight::{AnalysisConfig, NoopExtractor, Pipeline};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(AnalysisConfig::default(), Arc::new(NoopExtractor))?;
//! let result = pipeline.analyze_path("post.png").await?;
//!
//! println!("{}", result.engagement.category);
//! for advice in &result.engagement.recommendations {
//!     println!("- {advice}");
//! }
//! # Ok(())
//! # }
//! ```

// Internal module imports
pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod text;

/// Re-export error types for convenience
pub use error::{
    AnalysisError, HasRecoverySuggestion, HasSeverity, Recoverable, Retryable, SosmedResult,
};

pub use config::{AnalysisConfig, ScoringProfile, Thresholds};
pub use crate::core::{AnalysisResult, EngagementCategory, FeatureSet, TextResult};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use text::{NoopExtractor, OcrOutput, OcrSpaceClient, TextExtractor};
