//! # Text Signal Extractor
//!
//! Turns the OCR collaborator's output into text signals: CTA line
//! classification, keyword hits, simplicity and text density. No OCR happens
//! here.

use image::RgbImage;
use sosmed_scale::cpu::Filter;

use crate::config::TextConfig;
use crate::core::image_ops::{to_square, unique_colors};
use crate::core::{LineInsight, TextResult, WordBox};
use crate::error::SosmedResult;
use crate::text::ocr::OcrOutput;

/// Default call-to-action keywords (Indonesian).
pub const INDONESIAN_CTA_KEYWORDS: &[&str] = &[
    "beli", "klik", "scan", "pesan", "hubungi", "diskon", "gratis", "sekarang", "promo", "%",
];

/// English call-to-action keywords.
pub const ENGLISH_CTA_KEYWORDS: &[&str] = &[
    "buy", "click", "scan", "order", "contact", "discount", "free", "now", "promo", "%",
];

fn lowered<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Split into lines, drop empty and short lines, flag lines containing any
/// keyword (case-insensitive substring).
pub fn classify_lines<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    min_len: usize,
) -> (Vec<LineInsight>, bool) {
    let keywords = lowered(keywords);
    let insights: Vec<LineInsight> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().count() >= min_len)
        .map(|line| {
            let lower = line.to_lowercase();
            LineInsight {
                text: line.to_string(),
                is_cta: keywords.iter().any(|k| lower.contains(k.as_str())),
            }
        })
        .collect();
    let has_cta = insights.iter().any(|l| l.is_cta);
    (insights, has_cta)
}

/// Distinct keywords present anywhere in the text, in keyword-list order.
pub fn matched_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for k in lowered(keywords) {
        if lower.contains(k.as_str()) && !found.contains(&k) {
            found.push(k);
        }
    }
    found
}

/// Average of a palette term and a text-length term, each in [0, 1].
///
/// Palette term: `1 - min(unique colors of a side×side downsample / palette, 1)`.
/// Text term: `1 - min(chars / text_len, 1)`.
pub fn simplicity(
    image: &RgbImage,
    text: &str,
    side: u32,
    palette: usize,
    text_len: usize,
) -> SosmedResult<f64> {
    let small = to_square(image, side, Filter::Nearest)?;
    let color_term = 1.0 - (unique_colors(&small) as f64 / palette.max(1) as f64).min(1.0);
    let text_term = 1.0 - (text.chars().count() as f64 / text_len.max(1) as f64).min(1.0);
    let color_term = color_term.clamp(0.0, 1.0);
    let text_term = text_term.clamp(0.0, 1.0);
    Ok(((color_term + text_term) / 2.0).clamp(0.0, 1.0))
}

/// Sum of word-box areas over the image area; 0 without boxes.
pub fn text_density(boxes: Option<&[WordBox]>, dims: (u32, u32)) -> f64 {
    let area = f64::from(dims.0) * f64::from(dims.1);
    match boxes {
        Some(boxes) if area > 0.0 => boxes.iter().map(WordBox::area).sum::<f64>() / area,
        _ => 0.0,
    }
}

/// Builds a [`TextResult`] from OCR output with one text configuration.
#[derive(Debug, Clone)]
pub struct TextSignalExtractor {
    config: TextConfig,
    simplicity_side: u32,
}

impl TextSignalExtractor {
    pub fn new(config: TextConfig, simplicity_side: u32) -> Self {
        Self {
            config,
            simplicity_side,
        }
    }

    pub fn extract(&self, image: &RgbImage, ocr: OcrOutput) -> SosmedResult<TextResult> {
        let keywords = &self.config.keywords;
        let (lines, has_cta) = classify_lines(&ocr.text, keywords, self.config.min_line_len);
        let matched = matched_keywords(&ocr.text, keywords);
        let simplicity = simplicity(
            image,
            &ocr.text,
            self.simplicity_side,
            self.config.simplicity_palette,
            self.config.simplicity_text_len,
        )?;
        let text_density = text_density(ocr.word_boxes.as_deref(), image.dimensions());
        Ok(TextResult {
            raw_text: ocr.text,
            lines,
            has_cta,
            matched_keywords: matched,
            word_boxes: ocr.word_boxes,
            text_density,
            simplicity,
        })
    }
}
