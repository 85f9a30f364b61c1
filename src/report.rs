//! Plain-text summary of an [`AnalysisResult`] for terminal output.

use std::fmt::Write as _;

use crate::core::AnalysisResult;

/// Characters of extracted text shown before truncation.
pub const TEXT_PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= TEXT_PREVIEW_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(TEXT_PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Render a multi-line human summary.
pub fn render_summary(result: &AnalysisResult) -> String {
    let f = &result.features;
    let t = &result.text;
    let e = &result.engagement;
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(out, "Image: {}x{}", result.width, result.height);
    let _ = writeln!(
        out,
        "Engagement: {} ({} of {} checks, score {:.2})",
        e.category, e.points, e.max_points, e.score
    );

    let _ = writeln!(out, "\nVisual features");
    let [r, g, b] = f.dominant_color;
    let _ = writeln!(out, "  dominant color    rgb({r}, {g}, {b})");
    let _ = writeln!(out, "  color spectrum    {}", f.color_spectrum_count);
    let _ = writeln!(out, "  color diversity   {:.4}", f.color_diversity);
    let _ = writeln!(out, "  brightness        {:.1}", f.brightness);
    let _ = writeln!(out, "  saturation        {:.1}", f.saturation);
    let _ = writeln!(out, "  contrast          {:.2}", f.contrast);
    let _ = writeln!(out, "  edge complexity   {:.4}", f.edge_complexity);
    let _ = writeln!(out, "  whitespace        {:.1}%", f.whitespace_ratio * 100.0);
    let _ = writeln!(out, "  objects           {}", f.object_count);
    let _ = writeln!(out, "  object spread     {}", optional(f.object_regularity));
    let _ = writeln!(out, "  symmetry          {}", optional(f.symmetry_score));
    let _ = writeln!(out, "  complexity        {:.2}", f.complexity);

    let _ = writeln!(out, "\nText");
    if t.raw_text.trim().is_empty() {
        let _ = writeln!(out, "  no text detected");
    } else {
        let _ = writeln!(out, "  preview           {}", preview(&t.raw_text).replace('\n', " / "));
    }
    let _ = writeln!(out, "  call to action    {}", if t.has_cta { "yes" } else { "no" });
    if !t.matched_keywords.is_empty() {
        let _ = writeln!(out, "  keywords          {}", t.matched_keywords.join(", "));
    }
    for line in t.cta_lines() {
        let _ = writeln!(out, "  > {line}");
    }
    let _ = writeln!(out, "  text density      {:.4}", t.text_density);
    let _ = writeln!(out, "  simplicity        {:.2}", t.simplicity);

    if !e.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations");
        for (i, rec) in e.recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {rec}", i + 1);
        }
    }
    if !e.notes.is_empty() {
        let _ = writeln!(out, "\nNotes");
        for note in &e.notes {
            let _ = writeln!(out, "  - {note}");
        }
    }
    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings");
        for w in &result.warnings {
            let _ = writeln!(out, "  - {w}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_text() {
        let long = "a".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), TEXT_PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("  short  "), "short");
    }

    #[test]
    fn summary_lists_notes_after_recommendations() {
        use crate::config::{ScoringProfile, Thresholds};
        use crate::scoring::engagement::fixtures::{balanced_features, text};
        use crate::scoring::EngagementScorer;

        let mut features = balanced_features();
        features.contrast = 10.0;
        let mut text = text(false);
        text.simplicity = 0.2;
        let engagement = EngagementScorer::new(ScoringProfile::FiveFactor, Thresholds::default())
            .assess(&features, &text);
        let result = AnalysisResult {
            width: 640,
            height: 640,
            features,
            text,
            engagement,
            warnings: Vec::new(),
        };

        let summary = render_summary(&result);
        let recs = summary.find("Recommendations").unwrap();
        let notes = summary.find("Notes").unwrap();
        assert!(recs < notes);
        assert!(summary.contains("readability"));
        assert!(summary.contains("simplifying"));
        assert!(!summary.contains("Warnings"));
    }

    #[test]
    fn undefined_values_render_as_na() {
        assert_eq!(optional(None), "n/a");
        assert_eq!(optional(Some(0.456)), "0.46");
    }
}
