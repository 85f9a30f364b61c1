//! Recommendation engine: one advisory per failed check, in profile order,
//! plus unscored notes on readability and simplicity.

use crate::config::{ScoringProfile, Thresholds};
use crate::core::{FeatureSet, TextResult};
use crate::scoring::engagement::{checks, Check};

/// Advisory text for a failed check.
pub fn advice(check: Check, t: &Thresholds) -> String {
    match check {
        Check::CallToAction => {
            "Add a clear call to action such as \"Buy now\" or \"Scan here\"."
                .to_string()
        }
        Check::Contrast => {
            "Raise the contrast between text and background so captions stay readable.".to_string()
        }
        Check::WarmColor => {
            "Use a warmer, red-leaning dominant color to draw attention.".to_string()
        }
        Check::ColorBalance => format!(
            "Use between {} and {} distinct color groups for a balanced palette.",
            t.spectrum_min, t.spectrum_max
        ),
        Check::Luminance => format!(
            "Adjust overall brightness to sit between {:.0} and {:.0} out of 255.",
            t.luminance_min, t.luminance_max
        ),
        Check::ObjectCount => format!(
            "Keep between {} and {} main visual elements so the post has a clear focus.",
            t.objects_min, t.objects_max
        ),
        Check::Symmetry => {
            "Balance the composition so the left and right halves mirror each other more closely."
                .to_string()
        }
    }
}

/// Advisories for every failed check of `profile`, in check order; empty when
/// everything passes.
pub fn recommend(
    features: &FeatureSet,
    text: &TextResult,
    profile: ScoringProfile,
    t: &Thresholds,
) -> Vec<String> {
    checks(profile)
        .iter()
        .filter(|c| !c.passes(features, text, t))
        .map(|&c| advice(c, t))
        .collect()
}

/// Advisories outside the scored checks, readability first. Independent of
/// the profile.
pub fn notes(features: &FeatureSet, text: &TextResult, t: &Thresholds) -> Vec<String> {
    let mut notes = Vec::new();
    if features.contrast < t.readability_contrast_min {
        notes.push("Contrast is low. Improve text readability against the background.".to_string());
    }
    if text.simplicity < t.simplicity_min {
        notes.push(
            "The design is fairly complex. Consider simplifying the visual elements.".to_string(),
        );
    }
    notes
}
