//! # Analysis Data Model
//!
//! Records produced once per image and never mutated afterwards. All of them
//! serialize to JSON with `serde` for programmatic consumers.

use serde::{Deserialize, Serialize};

use crate::config::ScoringProfile;

/// An RGB triple, 0–255 per channel.
pub type Rgb = [u8; 3];

/// Palette and tone metrics from the color analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorFeatures {
    pub dominant_color: Rgb,
    /// Unique-color fraction of the diversity downsample, 0–1
    pub color_diversity: f64,
    /// Populated k-means clusters, at least 1
    pub color_spectrum_count: u32,
    /// Mean of all channel values, 0–255
    pub brightness: f64,
    /// Mean HSV saturation, 0–255
    pub saturation: f64,
    /// Normalized grayscale histogram entropy, 0–1
    pub complexity: f64,
}

/// Layout metrics from the structure analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureFeatures {
    /// Grayscale standard deviation
    pub contrast: f64,
    /// Fraction of Canny edge pixels
    pub edge_complexity: f64,
    /// Fraction of near-white pixels, 0–1
    pub whitespace_ratio: f64,
    pub object_count: u32,
    /// Standard deviation of object areas; `None` with fewer than two objects
    pub object_regularity: Option<f64>,
    /// Left/mirrored-right SSIM in [-1, 1]; `None` when too small to split
    pub symmetry_score: Option<f64>,
}

/// Full visual feature set for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    pub dominant_color: Rgb,
    pub contrast: f64,
    pub color_diversity: f64,
    pub brightness: f64,
    pub saturation: f64,
    pub edge_complexity: f64,
    pub whitespace_ratio: f64,
    pub color_spectrum_count: u32,
    pub object_count: u32,
    pub object_regularity: Option<f64>,
    pub symmetry_score: Option<f64>,
    pub complexity: f64,
}

impl FeatureSet {
    pub fn from_parts(color: ColorFeatures, structure: StructureFeatures) -> Self {
        Self {
            dominant_color: color.dominant_color,
            contrast: structure.contrast,
            color_diversity: color.color_diversity,
            brightness: color.brightness,
            saturation: color.saturation,
            edge_complexity: structure.edge_complexity,
            whitespace_ratio: structure.whitespace_ratio,
            color_spectrum_count: color.color_spectrum_count,
            object_count: structure.object_count,
            object_regularity: structure.object_regularity,
            symmetry_score: structure.symmetry_score,
            complexity: color.complexity,
        }
    }

    /// Luminance as used by the five-factor profile.
    pub fn luminance(&self) -> f64 {
        self.brightness
    }
}

/// Word bounding box in source-image pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl WordBox {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Rescale from an upload canvas back to source coordinates.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            left: self.left * sx,
            top: self.top * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// One kept OCR line and whether it reads as a call to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineInsight {
    pub text: String,
    pub is_cta: bool,
}

/// Text signals derived from the OCR collaborator output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextResult {
    pub raw_text: String,
    pub lines: Vec<LineInsight>,
    pub has_cta: bool,
    /// Distinct CTA keywords found anywhere in the text, in keyword-list order
    pub matched_keywords: Vec<String>,
    pub word_boxes: Option<Vec<WordBox>>,
    /// Box area over image area
    pub text_density: f64,
    /// Mean of the palette and text-length simplicity terms, 0–1
    pub simplicity: f64,
}

impl TextResult {
    /// Lines flagged as calls to action, in reading order.
    pub fn cta_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter(|l| l.is_cta).map(|l| l.text.as_str())
    }
}

/// Ordered engagement label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EngagementCategory {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EngagementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EngagementCategory::Low => "Low",
            EngagementCategory::Medium => "Medium",
            EngagementCategory::High => "High",
        };
        f.write_str(label)
    }
}

/// Heuristic engagement verdict plus the advice that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementAssessment {
    pub profile: ScoringProfile,
    pub points: u32,
    pub max_points: u32,
    /// `points / 3` for three-factor, `points` for five-factor
    pub score: f64,
    pub category: EngagementCategory,
    pub recommendations: Vec<String>,
    /// Advisories outside the scored checks: readability, then simplicity
    pub notes: Vec<String>,
}

/// Aggregate result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub width: u32,
    pub height: u32,
    pub features: FeatureSet,
    pub text: TextResult,
    pub engagement: EngagementAssessment,
    /// Degraded-path notices, e.g. an OCR failure replaced by empty text
    pub warnings: Vec<String>,
}
