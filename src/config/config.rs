//! # Analysis Configuration
//!
//! Every threshold the scorer and the recommendation engine compare against is
//! a named constant here, collected into [`Thresholds`] so a deployment can
//! override it from a TOML file without touching code.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Default | Used by |
//! |-----------|---------|---------|
//! | `profile` | `five-factor` | scorer, recommendations |
//! | `thresholds.contrast_min` | 30 | three-factor contrast check |
//! | `thresholds.red_channel_min` | 150 | three-factor warm-color check |
//! | `thresholds.spectrum_min..=spectrum_max` | 2..=5 | five-factor color richness |
//! | `thresholds.luminance_min..luminance_max` | (100, 220) exclusive | five-factor luminance |
//! | `thresholds.objects_min..=objects_max` | 1..=5 | five-factor object count |
//! | `thresholds.symmetry_min` | 0.6 exclusive | five-factor symmetry |
//! | `thresholds.readability_contrast_min` | 20 | readability note |
//! | `thresholds.simplicity_min` | 0.4 | simplicity note |
//! | `thresholds.whitespace_level` | 245 | whitespace ratio |
//! | `thresholds.min_object_area` | 50 px² | object regularity |
//! | `sizes.*` | 100 / 128 / 50 / 300 / 300 | working resolutions |
//! | `kmeans.k` / `seed` / `runs` / `max_iter` | 5 / 42 / 4 / 50 | color spectrum |
//! | `text.keywords` | Indonesian CTA set | line classification |
//! | `ocr.timeout_ms` | 15000 | OCR request bound |
//!
//! The OCR API key is never part of the serialized form. It is resolved at
//! process start from the `OCR_SPACE_API_KEY` environment variable or from
//! the `ocr.api_key` entry of a config file.
//!
//! ## Examples
//!
//! ```rust
//! use sosmed_insight::config::{AnalysisConfig, ScoringProfile};
//!
//! let config = AnalysisConfig::from_toml_str(r#"
//!     profile = "three-factor"
//!     [thresholds]
//!     contrast_min = 25.0
//! "#).unwrap();
//!
//! assert_eq!(config.profile, ScoringProfile::ThreeFactor);
//! assert_eq!(config.thresholds.contrast_min, 25.0);
//! assert_eq!(config.thresholds.red_channel_min, 150);
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sosmed_scale::presets::WorkingPreset;

use crate::error::{AnalysisError, SosmedResult};
use crate::text::signals::INDONESIAN_CTA_KEYWORDS;

/// Three-factor profile: minimum grayscale standard deviation.
pub const CONTRAST_MIN: f64 = 30.0;
/// Three-factor profile: minimum red channel of the dominant color.
pub const RED_CHANNEL_MIN: u8 = 150;
/// Five-factor profile: populated color clusters, inclusive range.
pub const SPECTRUM_MIN: u32 = 2;
pub const SPECTRUM_MAX: u32 = 5;
/// Five-factor profile: mean channel luminance, exclusive range.
pub const LUMINANCE_MIN: f64 = 100.0;
pub const LUMINANCE_MAX: f64 = 220.0;
/// Five-factor profile: segmented object count, inclusive range.
pub const OBJECTS_MIN: u32 = 1;
pub const OBJECTS_MAX: u32 = 5;
/// Five-factor profile: minimum left/right SSIM, exclusive.
pub const SYMMETRY_MIN: f64 = 0.6;
/// Five-factor category cutoffs on the point total.
pub const FIVE_FACTOR_HIGH_POINTS: u32 = 4;
pub const FIVE_FACTOR_MEDIUM_POINTS: u32 = 2;
/// Three-factor category cutoffs on the normalized score.
pub const THREE_FACTOR_HIGH_SCORE: f64 = 0.7;
pub const THREE_FACTOR_MEDIUM_SCORE: f64 = 0.3;
/// Contrast below which a readability note is added, independent of scoring.
pub const READABILITY_CONTRAST_MIN: f64 = 20.0;
/// Simplicity below which a note suggests simplifying the layout.
pub const SIMPLICITY_MIN: f64 = 0.4;
/// Grayscale level above which a pixel counts as whitespace.
pub const WHITESPACE_LEVEL: u8 = 245;
/// Contours at or below this area (px²) are ignored for regularity.
pub const MIN_OBJECT_AREA: f64 = 50.0;
/// Canny hysteresis thresholds.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Engagement scoring scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringProfile {
    /// CTA, contrast and warm dominant color; score in [0, 1]
    ThreeFactor,
    /// CTA, color spectrum, luminance, object count and symmetry; score in [0, 5]
    FiveFactor,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        ScoringProfile::FiveFactor
    }
}

impl ScoringProfile {
    /// Number of checks (and maximum points) of this profile.
    pub fn check_count(self) -> u32 {
        match self {
            ScoringProfile::ThreeFactor => 3,
            ScoringProfile::FiveFactor => 5,
        }
    }
}

/// Named thresholds shared by the scorer, the recommendation engine and the
/// structure analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub contrast_min: f64,
    pub red_channel_min: u8,
    pub spectrum_min: u32,
    pub spectrum_max: u32,
    pub luminance_min: f64,
    pub luminance_max: f64,
    pub objects_min: u32,
    pub objects_max: u32,
    pub symmetry_min: f64,
    pub five_factor_high_points: u32,
    pub five_factor_medium_points: u32,
    pub three_factor_high_score: f64,
    pub three_factor_medium_score: f64,
    pub readability_contrast_min: f64,
    pub simplicity_min: f64,
    pub whitespace_level: u8,
    pub min_object_area: f64,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            contrast_min: CONTRAST_MIN,
            red_channel_min: RED_CHANNEL_MIN,
            spectrum_min: SPECTRUM_MIN,
            spectrum_max: SPECTRUM_MAX,
            luminance_min: LUMINANCE_MIN,
            luminance_max: LUMINANCE_MAX,
            objects_min: OBJECTS_MIN,
            objects_max: OBJECTS_MAX,
            symmetry_min: SYMMETRY_MIN,
            five_factor_high_points: FIVE_FACTOR_HIGH_POINTS,
            five_factor_medium_points: FIVE_FACTOR_MEDIUM_POINTS,
            three_factor_high_score: THREE_FACTOR_HIGH_SCORE,
            three_factor_medium_score: THREE_FACTOR_MEDIUM_SCORE,
            readability_contrast_min: READABILITY_CONTRAST_MIN,
            simplicity_min: SIMPLICITY_MIN,
            whitespace_level: WHITESPACE_LEVEL,
            min_object_area: MIN_OBJECT_AREA,
            canny_low: CANNY_LOW,
            canny_high: CANNY_HIGH,
        }
    }
}

/// Square working resolutions (side in pixels) per analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingSizes {
    pub dominant: u32,
    pub diversity: u32,
    pub simplicity: u32,
    pub clustering: u32,
    pub segmentation: u32,
}

impl Default for WorkingSizes {
    fn default() -> Self {
        Self {
            dominant: WorkingPreset::Dominant.side(),
            diversity: WorkingPreset::Diversity.side(),
            simplicity: WorkingPreset::Simplicity.side(),
            clustering: WorkingPreset::Clustering.side(),
            segmentation: WorkingPreset::Segmentation.side(),
        }
    }
}

/// K-means parameters for the color spectrum.
///
/// Restart `i` seeds its generator with `seed + i`; identical inputs always
/// produce identical cluster counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub k: usize,
    pub seed: u64,
    pub runs: u32,
    pub max_iter: u32,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 5,
            seed: 42,
            runs: 4,
            max_iter: 50,
        }
    }
}

/// Text classification and simplicity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Case-insensitive CTA keywords, matched as substrings
    pub keywords: Vec<String>,
    /// Lines shorter than this many characters are dropped
    pub min_line_len: usize,
    /// Text length at which the text simplicity term reaches 0
    pub simplicity_text_len: usize,
    /// Unique-color count at which the color simplicity term reaches 0
    pub simplicity_palette: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            keywords: INDONESIAN_CTA_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            min_line_len: 5,
            simplicity_text_len: 200,
            simplicity_palette: 256,
        }
    }
}

/// OCR.space collaborator settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub endpoint: String,
    /// OCR.space language code (`ind`, `eng`, ...)
    pub language: String,
    /// Request per-word bounding boxes
    pub overlay: bool,
    pub timeout_ms: u64,
    /// Long side the upload is clamped to before JPEG encoding
    pub upload_long_side: u32,
    pub jpeg_quality: u8,
    /// Extra attempts on retryable failures, within the same timeout
    pub retries: u32,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.ocr.space/parse/image".to_string(),
            language: "ind".to_string(),
            overlay: true,
            timeout_ms: 15_000,
            upload_long_side: 1600,
            jpeg_quality: 85,
            retries: 1,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrConfig")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("overlay", &self.overlay)
            .field("timeout_ms", &self.timeout_ms)
            .field("upload_long_side", &self.upload_long_side)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("retries", &self.retries)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OcrConfig {
    /// Environment variable holding the OCR.space credential.
    pub const API_KEY_ENV: &'static str = "OCR_SPACE_API_KEY";

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Budget of one request: the overall timeout split evenly across the
    /// first attempt and every retry.
    pub fn attempt_timeout(&self) -> Duration {
        let attempts = u64::from(self.retries) + 1;
        Duration::from_millis((self.timeout_ms / attempts).max(1))
    }

    /// Fill `api_key` from the environment when the config did not set one.
    pub fn resolve_api_key_from_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var(Self::API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub profile: ScoringProfile,
    pub thresholds: Thresholds,
    pub sizes: WorkingSizes,
    pub kmeans: KMeansConfig,
    pub text: TextConfig,
    pub ocr: OcrConfig,
}

impl AnalysisConfig {
    /// Parse a TOML document; missing sections fall back to defaults.
    pub fn from_toml_str(source: &str) -> SosmedResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SosmedResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::io("read config", e).with_path(path.display().to_string())
        })?;
        let config = Self::from_toml_str(&source)
            .map_err(|e| e.with_context(format!("parsing {}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> SosmedResult<()> {
        let t = &self.thresholds;
        if t.spectrum_min > t.spectrum_max {
            return Err(AnalysisError::validation(
                "thresholds.spectrum_min",
                "must not exceed spectrum_max",
                t.spectrum_min.to_string(),
            ));
        }
        if t.luminance_min >= t.luminance_max {
            return Err(AnalysisError::validation(
                "thresholds.luminance_min",
                "must be below luminance_max",
                t.luminance_min.to_string(),
            ));
        }
        if t.objects_min > t.objects_max {
            return Err(AnalysisError::validation(
                "thresholds.objects_min",
                "must not exceed objects_max",
                t.objects_min.to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&t.symmetry_min) {
            return Err(AnalysisError::validation(
                "thresholds.symmetry_min",
                "must lie in [-1, 1]",
                t.symmetry_min.to_string(),
            ));
        }
        if t.canny_low > t.canny_high {
            return Err(AnalysisError::validation(
                "thresholds.canny_low",
                "must not exceed canny_high",
                t.canny_low.to_string(),
            ));
        }
        let sizes = [
            ("sizes.dominant", self.sizes.dominant),
            ("sizes.diversity", self.sizes.diversity),
            ("sizes.simplicity", self.sizes.simplicity),
            ("sizes.clustering", self.sizes.clustering),
            ("sizes.segmentation", self.sizes.segmentation),
        ];
        for (field, side) in sizes {
            if !(1..=4096).contains(&side) {
                return Err(AnalysisError::validation(field, "must be in 1..=4096", side.to_string()));
            }
        }
        if !(1..=32).contains(&self.kmeans.k) {
            return Err(AnalysisError::validation(
                "kmeans.k",
                "must be in 1..=32",
                self.kmeans.k.to_string(),
            ));
        }
        if self.kmeans.runs == 0 || self.kmeans.max_iter == 0 {
            return Err(AnalysisError::validation(
                "kmeans.runs",
                "runs and max_iter must be greater than 0",
                format!("{}/{}", self.kmeans.runs, self.kmeans.max_iter),
            ));
        }
        if self.text.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AnalysisError::validation(
                "text.keywords",
                "must contain at least one keyword",
                "[]",
            ));
        }
        if self.text.simplicity_text_len == 0 || self.text.simplicity_palette == 0 {
            return Err(AnalysisError::validation(
                "text.simplicity_text_len",
                "simplicity denominators must be greater than 0",
                format!(
                    "{}/{}",
                    self.text.simplicity_text_len, self.text.simplicity_palette
                ),
            ));
        }
        if self.ocr.timeout_ms == 0 {
            return Err(AnalysisError::validation("ocr.timeout_ms", "must be greater than 0", "0"));
        }
        if !(1..=100).contains(&self.ocr.jpeg_quality) {
            return Err(AnalysisError::validation(
                "ocr.jpeg_quality",
                "must be in 1..=100",
                self.ocr.jpeg_quality.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.profile, ScoringProfile::FiveFactor);
        assert_eq!(config.sizes.dominant, 100);
        assert_eq!(config.sizes.diversity, 128);
        assert_eq!(config.kmeans.k, 5);
        assert_eq!(config.ocr.language, "ind");
        assert!(config.text.keywords.iter().any(|k| k == "diskon"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalysisConfig::default();

        config.thresholds.luminance_min = 230.0;
        assert!(config.validate().is_err());
        config.thresholds = Thresholds::default();

        config.kmeans.k = 0;
        assert!(config.validate().is_err());
        config.kmeans.k = 5;

        config.sizes.segmentation = 0;
        assert!(config.validate().is_err());
        config.sizes = WorkingSizes::default();

        config.text.keywords = vec!["  ".to_string()];
        assert!(config.validate().is_err());
        config.text = TextConfig::default();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let mut config = AnalysisConfig::default();
        config.ocr.api_key = Some("secret-value".to_string());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret-value"));
        assert!(!format!("{:?}", config.ocr).contains("secret-value"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [text]
            keywords = ["buy", "click"]
            [ocr]
            language = "eng"
            api_key = "from-file"
            "#,
        )
        .unwrap();
        assert_eq!(config.text.keywords, vec!["buy", "click"]);
        assert_eq!(config.text.min_line_len, 5);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.ocr.timeout_ms, 15_000);
    }

    #[test]
    fn test_attempt_timeout_splits_budget() {
        let mut ocr = OcrConfig {
            timeout_ms: 3_000,
            retries: 2,
            ..OcrConfig::default()
        };
        assert_eq!(ocr.attempt_timeout(), Duration::from_millis(1_000));
        ocr.retries = 0;
        assert_eq!(ocr.attempt_timeout(), ocr.timeout());
        ocr.timeout_ms = 0;
        assert_eq!(ocr.attempt_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_unknown_profile_is_config_error() {
        let err = AnalysisConfig::from_toml_str(r#"profile = "seven-factor""#).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = AnalysisConfig::load("/definitely/not/here.toml").unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
