//! # Analysis Pipeline
//!
//! Orchestrates one analysis call: decode, color and structure features,
//! text extraction, then scoring and recommendations.
//!
//! The analyzers are CPU-bound and run on the blocking pool while the OCR
//! request is in flight. OCR failures never escape the pipeline: the result
//! carries empty text, no word boxes, and a warning instead.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sosmed_insight::pipeline::Pipeline;
//! use sosmed_insight::text::NoopExtractor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::builder()
//!     .with_extractor(Arc::new(NoopExtractor))
//!     .build()?;
//! let result = pipeline.analyze_path("post.jpg").await?;
//! println!("{} ({} points)", result.engagement.category, result.engagement.points);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::analysis::{ColorAnalyzer, StructureAnalyzer};
use crate::config::AnalysisConfig;
use crate::core::{AnalysisResult, FeatureSet};
use crate::error::{AnalysisError, SosmedResult};
use crate::scoring::EngagementScorer;
use crate::text::{NoopExtractor, OcrOutput, TextExtractor, TextSignalExtractor};

/// Decode PNG/JPEG bytes into an RGB raster.
pub fn decode_image(bytes: &[u8]) -> SosmedResult<RgbImage> {
    if bytes.is_empty() {
        return Err(AnalysisError::invalid_image("empty input"));
    }
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::invalid_image(format!("cannot decode image: {e}")))?;
    let rgb = decoded.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(AnalysisError::invalid_image("image has zero width or height"));
    }
    Ok(rgb)
}

/// One configured analyzer chain.
pub struct Pipeline {
    config: Arc<AnalysisConfig>,
    extractor: Arc<dyn TextExtractor>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Validate `config` and wire it to `extractor`.
    pub fn new(config: AnalysisConfig, extractor: Arc<dyn TextExtractor>) -> SosmedResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            extractor,
        })
    }

    /// Read and analyze an image file.
    pub async fn analyze_path(&self, path: impl AsRef<Path>) -> SosmedResult<AnalysisResult> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AnalysisError::io("read image", e).with_path(path.display().to_string())
        })?;
        self.analyze_bytes(&bytes).await
    }

    /// Decode and analyze PNG/JPEG bytes.
    pub async fn analyze_bytes(&self, bytes: &[u8]) -> SosmedResult<AnalysisResult> {
        let image = decode_image(bytes)?;
        self.analyze_image(image).await
    }

    /// Analyze a decoded raster.
    pub async fn analyze_image(&self, image: RgbImage) -> SosmedResult<AnalysisResult> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid_image("image has zero width or height"));
        }
        let started = Instant::now();
        let image = Arc::new(image);

        let visual = {
            let image = Arc::clone(&image);
            let color = ColorAnalyzer::new(self.config.sizes, self.config.kmeans);
            let structure =
                StructureAnalyzer::new(self.config.sizes, self.config.thresholds.clone());
            tokio::task::spawn_blocking(move || -> SosmedResult<FeatureSet> {
                Ok(FeatureSet::from_parts(
                    color.analyze(&image)?,
                    structure.analyze(&image)?,
                ))
            })
        };

        let mut warnings = Vec::new();
        let (visual, ocr) = tokio::join!(visual, self.extract_text(&image, &mut warnings));
        let features = visual.map_err(|e| {
            AnalysisError::processing("feature analysis", format!("worker failed: {e}"))
        })??;

        let text = TextSignalExtractor::new(self.config.text.clone(), self.config.sizes.simplicity)
            .extract(&image, ocr)?;
        let engagement = EngagementScorer::new(self.config.profile, self.config.thresholds.clone())
            .assess(&features, &text);

        info!(
            width,
            height,
            profile = ?engagement.profile,
            points = engagement.points,
            category = %engagement.category,
            has_cta = text.has_cta,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        Ok(AnalysisResult {
            width,
            height,
            features,
            text,
            engagement,
            warnings,
        })
    }

    /// Run the collaborator under the configured timeout, degrading every
    /// failure to empty output plus a warning.
    async fn extract_text(&self, image: &RgbImage, warnings: &mut Vec<String>) -> OcrOutput {
        let timeout = self.config.ocr.timeout();
        let error = match tokio::time::timeout(timeout, self.extractor.extract_text(image)).await {
            Ok(Ok(output)) => {
                debug!(extractor = self.extractor.name(), "text extracted");
                return output;
            }
            Ok(Err(e)) => e,
            Err(_) => AnalysisError::timeout("text extraction", self.config.ocr.timeout_ms),
        };
        warn!(
            extractor = self.extractor.name(),
            category = error.category(),
            error = %error,
            "text extraction failed, continuing without text"
        );
        warnings.push(format!("text extraction unavailable: {error}"));
        OcrOutput::default()
    }
}

/// Fluent construction of a [`Pipeline`].
pub struct PipelineBuilder {
    config: AnalysisConfig,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            extractor: None,
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build the pipeline; without an extractor no text is read.
    pub fn build(self) -> SosmedResult<Pipeline> {
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(NoopExtractor));
        Pipeline::new(self.config, extractor)
    }
}
