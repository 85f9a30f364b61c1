// SPDX-License-Identifier: MIT
//! # Resampling Plans and Working Resolutions
//!
//! A [`ScalePlan`] is computed once from the source size, a [`ScaleTarget`]
//! and an [`AspectMode`], then handed to the resizer.
//!
//! Two kinds of plans are used by the analyzer:
//! - **Analysis squares** (`Exact` + `Distort`): every metric runs on an
//!   N×N canvas regardless of the input aspect ratio, so per-pixel fractions
//!   and unique-color counts share one denominator.
//! - **Upload bounds** (`MaxLongSide` + `Preserve`): large photos are clamped
//!   before being JPEG-encoded for the OCR service. Never upscales.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Square size of the given side.
    pub const fn square(side: u32) -> Self {
        Self { w: side, h: side }
    }
}

/// Defines how aspect ratio differences are handled during scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectMode {
    /// Keep original aspect ratio; output fits entirely within target bounds.
    Preserve,
    /// Stretch/squeeze image to exactly match target dimensions.
    Distort,
}

/// Defines the target size constraint for scaling operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleTarget {
    /// Clamp the longest side to a maximum value, derive the other side proportionally.
    MaxLongSide(u32),
    /// Force output to exact dimensions.
    Exact(Size),
}

/// Complete scaling plan computed from input parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Target size constraint used for planning
    pub target: ScaleTarget,
    /// Aspect ratio handling strategy
    pub aspect: AspectMode,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the plan leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }

    /// Horizontal and vertical factors mapping output coordinates back to input.
    pub fn inverse_factors(&self) -> (f64, f64) {
        (
            f64::from(self.input.w) / f64::from(self.out.w.max(1)),
            f64::from(self.input.h) / f64::from(self.out.h.max(1)),
        )
    }
}

/// Compute a complete scaling plan from input parameters.
///
/// `MaxLongSide` with `Distort` yields a square canvas of that side.
pub fn build_plan(input: Size, target: ScaleTarget, aspect: AspectMode) -> ScalePlan {
    let out = match (target, aspect) {
        (ScaleTarget::MaxLongSide(max_side), AspectMode::Preserve) => {
            let (w, h) = fit_preserve(input, max_side);
            Size { w, h }
        }
        (ScaleTarget::MaxLongSide(max_side), AspectMode::Distort) => Size::square(max_side.max(1)),
        (ScaleTarget::Exact(out), AspectMode::Distort) => Size {
            w: out.w.max(1),
            h: out.h.max(1),
        },
        (ScaleTarget::Exact(out), AspectMode::Preserve) => {
            let (w, h) = fit_within(input, out);
            Size { w, h }
        }
    };
    ScalePlan {
        input,
        target,
        aspect,
        out,
    }
}

/// Fit image within max_side constraint while preserving aspect ratio.
/// Never upscales.
fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    let long = w.max(h).max(1.0);
    let s = (f64::from(max_long) / long).min(1.0);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Fit image within a bounding box while preserving aspect ratio.
fn fit_within(input: Size, box_: Size) -> (u32, u32) {
    let (w, h) = (f64::from(input.w).max(1.0), f64::from(input.h).max(1.0));
    let (bw, bh) = (f64::from(box_.w), f64::from(box_.h));
    let s = (bw / w).min(bh / h).min(1.0);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Named working resolutions used by the analyzers.
///
/// Each preset is a square side; the analyzer configuration may override the
/// side, the preset only fixes the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkingPreset {
    /// 100×100, most-frequent color
    Dominant,
    /// 128×128, unique-color fraction
    Diversity,
    /// 50×50, unique colors over a 256 palette for the simplicity score
    Simplicity,
    /// 300×300, k-means color clustering
    Clustering,
    /// 300×300, Otsu binarization and contour extraction
    Segmentation,
}

impl WorkingPreset {
    /// Default square side for this preset.
    pub const fn side(self) -> u32 {
        match self {
            WorkingPreset::Dominant => 100,
            WorkingPreset::Diversity => 128,
            WorkingPreset::Simplicity => 50,
            WorkingPreset::Clustering | WorkingPreset::Segmentation => 300,
        }
    }

    /// Convert preset to the corresponding ScaleTarget for plan computation.
    pub fn to_target(self) -> ScaleTarget {
        ScaleTarget::Exact(Size::square(self.side()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserve_never_upscales() {
        let plan = build_plan(
            Size { w: 320, h: 200 },
            ScaleTarget::MaxLongSide(1600),
            AspectMode::Preserve,
        );
        assert!(plan.is_identity());
    }

    #[test]
    fn preserve_clamps_long_side() {
        let plan = build_plan(
            Size { w: 4000, h: 2000 },
            ScaleTarget::MaxLongSide(1600),
            AspectMode::Preserve,
        );
        assert_eq!(plan.out, Size { w: 1600, h: 800 });
        assert_eq!(plan.inverse_factors(), (2.5, 2.5));
    }

    #[test]
    fn exact_distort_ignores_aspect() {
        let plan = build_plan(
            Size { w: 1080, h: 1350 },
            WorkingPreset::Segmentation.to_target(),
            AspectMode::Distort,
        );
        assert_eq!(plan.out, Size::square(300));
    }

    #[test]
    fn exact_preserve_fits_inside_box() {
        let plan = build_plan(
            Size { w: 1000, h: 500 },
            ScaleTarget::Exact(Size { w: 100, h: 100 }),
            AspectMode::Preserve,
        );
        assert_eq!(plan.out, Size { w: 100, h: 50 });
    }
}
