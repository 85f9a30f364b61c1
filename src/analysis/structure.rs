//! # Structure Analyzer
//!
//! Layout metrics on the grayscale image: contrast, edge density, whitespace,
//! object segmentation and left/right symmetry.
//!
//! Degenerate inputs never fail the analysis. Object regularity with fewer
//! than two qualifying objects and symmetry of an image too small to split
//! are reported as `None`.

use image::{GrayImage, Luma, RgbImage};
use image_compare::Algorithm;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use sosmed_scale::cpu::Filter;
use tracing::debug;

use crate::config::{Thresholds, WorkingSizes};
use crate::core::image_ops::{grayscale, mean_std, to_square};
use crate::core::StructureFeatures;
use crate::error::SosmedResult;

/// Smallest half width/height the SSIM window accepts.
pub const SSIM_MIN_SIDE: u32 = 8;

/// Grayscale population standard deviation.
pub fn contrast(image: &RgbImage) -> f64 {
    let gray = grayscale(image);
    mean_std(gray.pixels().map(|p| f64::from(p.0[0]))).1
}

/// Fraction of pixels on a Canny edge (mean edge response / 255).
pub fn edge_complexity(image: &RgbImage, low: f32, high: f32) -> f64 {
    let gray = grayscale(image);
    if gray.width() == 0 || gray.height() == 0 {
        return 0.0;
    }
    let edges = canny(&gray, low, high);
    let (mean, _) = mean_std(edges.pixels().map(|p| f64::from(p.0[0])));
    mean / 255.0
}

/// Fraction of grayscale pixels strictly brighter than `level`.
pub fn whitespace_ratio(image: &RgbImage, level: u8) -> f64 {
    let gray = grayscale(image);
    let total = u64::from(gray.width()) * u64::from(gray.height());
    if total == 0 {
        return 0.0;
    }
    let bright = gray.pixels().filter(|p| p.0[0] > level).count();
    bright as f64 / total as f64
}

/// Shoelace area of a closed contour, in px².
fn contour_area(contour: &Contour<i32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 3 {
        return 0.0;
    }
    let twice: i64 = pts
        .iter()
        .zip(pts.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice.unsigned_abs() as f64 / 2.0
}

/// Inverted Otsu binarization: pixels at or below the level become foreground.
fn binarize_inverted(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Surround the mask with a 1-px background frame. `find_contours` only opens
/// an outer border after a background pixel, so foreground touching the image
/// edge would otherwise be lost.
fn pad_background(binary: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(binary.width() + 2, binary.height() + 2);
    image::imageops::replace(&mut padded, binary, 1, 1);
    padded
}

/// Count external contours of the binarized `side`×`side` canvas and the
/// standard deviation of the areas above `min_area`.
pub fn segment_objects(
    image: &RgbImage,
    side: u32,
    min_area: f64,
) -> SosmedResult<(u32, Option<f64>)> {
    let work = to_square(image, side, Filter::Bilinear)?;
    let binary = pad_background(&binarize_inverted(&grayscale(&work)));

    let contours = find_contours::<i32>(&binary);
    let external: Vec<&Contour<i32>> = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect();

    let areas: Vec<f64> = external
        .iter()
        .map(|c| contour_area(c))
        .filter(|&a| a > min_area)
        .collect();
    let regularity = if areas.len() >= 2 {
        Some(mean_std(areas.iter().copied()).1)
    } else {
        None
    };
    Ok((external.len() as u32, regularity))
}

/// SSIM between the left half and the mirrored right half, in [-1, 1].
pub fn symmetry(image: &RgbImage) -> Option<f64> {
    let gray = grayscale(image);
    let (w, h) = gray.dimensions();
    let mid = w / 2;
    let width = mid.min(w - mid);
    if width < SSIM_MIN_SIDE || h < SSIM_MIN_SIDE {
        return None;
    }

    let left = image::imageops::crop_imm(&gray, 0, 0, width, h).to_image();
    let right = image::imageops::crop_imm(&gray, mid, 0, w - mid, h).to_image();
    let mirrored = image::imageops::flip_horizontal(&right);
    let mirrored = image::imageops::crop_imm(&mirrored, 0, 0, width, h).to_image();

    match image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, &left, &mirrored) {
        Ok(similarity) => Some(similarity.score.clamp(-1.0, 1.0)),
        Err(e) => {
            debug!(error = ?e, "symmetry undefined");
            None
        }
    }
}

/// Runs every structure metric with one configuration.
#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    sizes: WorkingSizes,
    thresholds: Thresholds,
}

impl StructureAnalyzer {
    pub fn new(sizes: WorkingSizes, thresholds: Thresholds) -> Self {
        Self { sizes, thresholds }
    }

    pub fn analyze(&self, image: &RgbImage) -> SosmedResult<StructureFeatures> {
        let t = &self.thresholds;
        let (object_count, object_regularity) =
            segment_objects(image, self.sizes.segmentation, t.min_object_area)?;
        let features = StructureFeatures {
            contrast: contrast(image),
            edge_complexity: edge_complexity(image, t.canny_low, t.canny_high),
            whitespace_ratio: whitespace_ratio(image, t.whitespace_level),
            object_count,
            object_regularity,
            symmetry_score: symmetry(image),
        };
        debug!(
            contrast = features.contrast,
            edges = features.edge_complexity,
            whitespace = features.whitespace_ratio,
            objects = features.object_count,
            regularity = ?features.object_regularity,
            symmetry = ?features.symmetry_score,
            "structure features computed"
        );
        Ok(features)
    }
}
