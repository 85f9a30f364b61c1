//! Raster helpers shared by the analyzers: working-resolution resampling,
//! grayscale conversion and small statistics.

use std::collections::HashSet;

use image::{GrayImage, RgbImage};
use sosmed_scale::cpu::{resize_rgb, Filter};
use sosmed_scale::presets::{build_plan, AspectMode, ScalePlan, ScaleTarget, Size};

use crate::error::{AnalysisError, SosmedResult};

pub fn size_of(image: &RgbImage) -> Size {
    Size {
        w: image.width(),
        h: image.height(),
    }
}

/// Resample to a `side`×`side` working canvas, ignoring aspect ratio.
pub fn to_square(image: &RgbImage, side: u32, filter: Filter) -> SosmedResult<RgbImage> {
    let src = size_of(image);
    let plan = build_plan(src, ScaleTarget::Exact(Size::square(side)), AspectMode::Distort);
    apply_plan(image, &plan, filter)
}

/// Clamp the long side for upload; returns the canvas and the plan used.
pub fn clamp_long_side(image: &RgbImage, long_side: u32) -> SosmedResult<(RgbImage, ScalePlan)> {
    let plan = build_plan(
        size_of(image),
        ScaleTarget::MaxLongSide(long_side),
        AspectMode::Preserve,
    );
    let out = apply_plan(image, &plan, Filter::Bilinear)?;
    Ok((out, plan))
}

fn apply_plan(image: &RgbImage, plan: &ScalePlan, filter: Filter) -> SosmedResult<RgbImage> {
    let buf = resize_rgb(image.as_raw(), size_of(image), plan, filter)?;
    RgbImage::from_raw(plan.out.w, plan.out.h, buf).ok_or_else(|| {
        AnalysisError::processing("resample", "output buffer does not match planned size")
    })
}

pub fn grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Number of distinct RGB values.
pub fn unique_colors(image: &RgbImage) -> usize {
    image.pixels().map(|p| p.0).collect::<HashSet<_>>().len()
}

/// Population mean and standard deviation; `(0, 0)` for an empty input.
pub fn mean_std<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    // Welford
    let mut n = 0f64;
    let mut mean = 0f64;
    let mut m2 = 0f64;
    for v in values {
        n += 1.0;
        let delta = v - mean;
        mean += delta / n;
        m2 += delta * (v - mean);
    }
    if n == 0.0 {
        (0.0, 0.0)
    } else {
        (mean, (m2 / n).max(0.0).sqrt())
    }
}
