//! # Engagement Scorer
//!
//! Heuristic engagement label from visual features and text signals. Each
//! profile is a fixed, ordered list of pass/fail checks; the category
//! follows from how many pass.

use serde::Serialize;

use crate::config::{ScoringProfile, Thresholds};
use crate::core::{EngagementAssessment, EngagementCategory, FeatureSet, TextResult};
use crate::scoring::recommend;

/// One pass/fail heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// At least one OCR line reads as a call to action
    CallToAction,
    /// Grayscale contrast above the readability floor
    Contrast,
    /// Dominant red channel above the warmth floor
    WarmColor,
    /// Populated color clusters inside the balanced range
    ColorBalance,
    /// Mean brightness strictly inside the comfortable band
    Luminance,
    /// Segmented objects inside the focused range
    ObjectCount,
    /// Left/right similarity above the floor
    Symmetry,
}

const THREE_FACTOR: &[Check] = &[Check::CallToAction, Check::Contrast, Check::WarmColor];

const FIVE_FACTOR: &[Check] = &[
    Check::CallToAction,
    Check::ColorBalance,
    Check::Luminance,
    Check::ObjectCount,
    Check::Symmetry,
];

/// Checks of a profile in evaluation order.
pub fn checks(profile: ScoringProfile) -> &'static [Check] {
    match profile {
        ScoringProfile::ThreeFactor => THREE_FACTOR,
        ScoringProfile::FiveFactor => FIVE_FACTOR,
    }
}

impl Check {
    pub fn passes(self, features: &FeatureSet, text: &TextResult, t: &Thresholds) -> bool {
        match self {
            Check::CallToAction => text.has_cta,
            Check::Contrast => features.contrast > t.contrast_min,
            Check::WarmColor => features.dominant_color[0] > t.red_channel_min,
            Check::ColorBalance => {
                (t.spectrum_min..=t.spectrum_max).contains(&features.color_spectrum_count)
            }
            Check::Luminance => {
                let l = features.luminance();
                l > t.luminance_min && l < t.luminance_max
            }
            Check::ObjectCount => (t.objects_min..=t.objects_max).contains(&features.object_count),
            // undefined symmetry counts as unbalanced
            Check::Symmetry => features.symmetry_score.is_some_and(|s| s > t.symmetry_min),
        }
    }
}

/// Points, score and category of one profile.
pub fn score(
    features: &FeatureSet,
    text: &TextResult,
    profile: ScoringProfile,
    t: &Thresholds,
) -> (u32, f64, EngagementCategory) {
    let points = checks(profile)
        .iter()
        .filter(|c| c.passes(features, text, t))
        .count() as u32;

    match profile {
        ScoringProfile::ThreeFactor => {
            let score = f64::from(points) / f64::from(profile.check_count());
            let category = if score > t.three_factor_high_score {
                EngagementCategory::High
            } else if score >= t.three_factor_medium_score {
                EngagementCategory::Medium
            } else {
                EngagementCategory::Low
            };
            (points, score, category)
        }
        ScoringProfile::FiveFactor => {
            let category = if points >= t.five_factor_high_points {
                EngagementCategory::High
            } else if points >= t.five_factor_medium_points {
                EngagementCategory::Medium
            } else {
                EngagementCategory::Low
            };
            (points, f64::from(points), category)
        }
    }
}

/// Scores one image under one profile.
#[derive(Debug, Clone)]
pub struct EngagementScorer {
    profile: ScoringProfile,
    thresholds: Thresholds,
}

impl EngagementScorer {
    pub fn new(profile: ScoringProfile, thresholds: Thresholds) -> Self {
        Self {
            profile,
            thresholds,
        }
    }

    pub fn assess(&self, features: &FeatureSet, text: &TextResult) -> EngagementAssessment {
        let (points, score, category) = score(features, text, self.profile, &self.thresholds);
        EngagementAssessment {
            profile: self.profile,
            points,
            max_points: self.profile.check_count(),
            score,
            category,
            recommendations: recommend::recommend(features, text, self.profile, &self.thresholds),
            notes: recommend::notes(features, text, &self.thresholds),
        }
    }
}
