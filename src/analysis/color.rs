//! # Color Analyzer
//!
//! Palette and tone metrics: dominant color, unique-color diversity, k-means
//! color spectrum, brightness, saturation and histogram complexity.
//!
//! Palette metrics resample with the nearest-neighbour filter so the working
//! canvas only ever holds colors that exist in the source.

use std::collections::BTreeMap;

use image::RgbImage;
use sosmed_scale::cpu::Filter;
use tracing::debug;

use crate::analysis::kmeans;
use crate::config::{KMeansConfig, WorkingSizes};
use crate::core::image_ops::{grayscale, to_square, unique_colors};
use crate::core::{ColorFeatures, Rgb};
use crate::error::SosmedResult;

/// Most frequent RGB value of a `side`×`side` downsample.
///
/// Ties go to the value that sorts first (lexicographic R, G, B).
pub fn dominant_color(image: &RgbImage, side: u32) -> SosmedResult<Rgb> {
    let small = to_square(image, side, Filter::Nearest)?;
    let mut counts: BTreeMap<Rgb, u32> = BTreeMap::new();
    for px in small.pixels() {
        *counts.entry(px.0).or_insert(0) += 1;
    }
    let mut best: (Rgb, u32) = ([0, 0, 0], 0);
    for (color, count) in counts {
        if count > best.1 {
            best = (color, count);
        }
    }
    Ok(best.0)
}

/// Distinct colors of a `side`×`side` downsample divided by its pixel count
/// (`side²`, 16384 at the default 128), so the value is the unique-pixel
/// fraction in [0, 1].
pub fn color_diversity(image: &RgbImage, side: u32) -> SosmedResult<f64> {
    let small = to_square(image, side, Filter::Nearest)?;
    let total = f64::from(small.width()) * f64::from(small.height());
    Ok((unique_colors(&small) as f64 / total).clamp(0.0, 1.0))
}

/// Populated k-means clusters of a `side`×`side` bilinear resize; at least 1.
pub fn color_spectrum(image: &RgbImage, side: u32, params: &KMeansConfig) -> SosmedResult<u32> {
    let small = to_square(image, side, Filter::Bilinear)?;
    let populated = kmeans::cluster(small.pixels().map(|p| p.0), params)
        .map(|outcome| outcome.populated())
        .unwrap_or(1);
    Ok(populated.clamp(1, params.k.max(1)) as u32)
}

/// Mean over every channel value of every pixel, 0–255.
pub fn brightness(image: &RgbImage) -> f64 {
    let raw = image.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let sum: u64 = raw.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / raw.len() as f64
}

/// Mean HSV saturation on the 0–255 scale.
pub fn saturation(image: &RgbImage) -> f64 {
    let n = u64::from(image.width()) * u64::from(image.height());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max == 0 {
                0.0
            } else {
                f64::from(max - min) * 255.0 / f64::from(max)
            }
        })
        .sum();
    sum / n as f64
}

/// Shannon entropy of the grayscale histogram divided by 8 bits.
pub fn complexity(image: &RgbImage) -> f64 {
    let gray = grayscale(image);
    let total = f64::from(gray.width()) * f64::from(gray.height());
    if total == 0.0 {
        return 0.0;
    }
    let mut histogram = [0u64; 256];
    for px in gray.pixels() {
        histogram[px.0[0] as usize] += 1;
    }
    let entropy: f64 = histogram
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            -p * (p + 1e-6).log2()
        })
        .sum();
    (entropy / 8.0).clamp(0.0, 1.0)
}

/// Runs every color metric with one configuration.
#[derive(Debug, Clone)]
pub struct ColorAnalyzer {
    sizes: WorkingSizes,
    kmeans: KMeansConfig,
}

impl ColorAnalyzer {
    pub fn new(sizes: WorkingSizes, kmeans: KMeansConfig) -> Self {
        Self { sizes, kmeans }
    }

    pub fn analyze(&self, image: &RgbImage) -> SosmedResult<ColorFeatures> {
        let features = ColorFeatures {
            dominant_color: dominant_color(image, self.sizes.dominant)?,
            color_diversity: color_diversity(image, self.sizes.diversity)?,
            color_spectrum_count: color_spectrum(image, self.sizes.clustering, &self.kmeans)?,
            brightness: brightness(image),
            saturation: saturation(image),
            complexity: complexity(image),
        };
        debug!(
            dominant = ?features.dominant_color,
            diversity = features.color_diversity,
            spectrum = features.color_spectrum_count,
            brightness = features.brightness,
            saturation = features.saturation,
            complexity = features.complexity,
            "color features computed"
        );
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Px;

    fn solid(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(64, 48, Px([r, g, b]))
    }

    #[test]
    fn dominant_color_of_mostly_red_image() {
        let mut img = solid(220, 30, 30);
        for x in 0..10 {
            img.put_pixel(x, 0, Px([0, 0, 255]));
        }
        assert_eq!(dominant_color(&img, 100).unwrap(), [220, 30, 30]);
    }

    #[test]
    fn dominant_color_tie_prefers_lowest_value() {
        let img = RgbImage::from_fn(100, 100, |x, _| {
            if x < 50 { Px([200, 0, 0]) } else { Px([10, 10, 10]) }
        });
        assert_eq!(dominant_color(&img, 100).unwrap(), [10, 10, 10]);
    }

    #[test]
    fn solid_image_palette_metrics() {
        let img = solid(40, 120, 200);
        assert_eq!(color_spectrum(&img, 300, &KMeansConfig::default()).unwrap(), 1);
        let diversity = color_diversity(&img, 128).unwrap();
        assert!((diversity - 1.0 / 16384.0).abs() < 1e-12);
    }

    #[test]
    fn brightness_and_saturation_ranges() {
        assert_eq!(brightness(&solid(255, 255, 255)), 255.0);
        assert_eq!(brightness(&solid(0, 0, 0)), 0.0);
        assert!((brightness(&solid(30, 60, 90)) - 60.0).abs() < 1e-9);
        assert_eq!(saturation(&solid(0, 0, 0)), 0.0);
        assert_eq!(saturation(&solid(128, 128, 128)), 0.0);
        assert!((saturation(&solid(255, 0, 0)) - 255.0).abs() < 1e-9);
    }

    #[test]
    fn complexity_grows_with_tonal_range() {
        let flat = complexity(&solid(90, 90, 90));
        let ramp = complexity(&RgbImage::from_fn(256, 4, |x, _| {
            let v = x as u8;
            Px([v, v, v])
        }));
        assert!(flat < 0.01);
        assert!(ramp > 0.9 && ramp <= 1.0);
    }
}
