// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGB8 in → RGB8 out, tightly packed rows on both sides.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeAlg, ResizeOptions, Resizer};

use crate::presets::{ScalePlan, Size};

#[derive(Debug)]
pub enum ScaleError {
    EmptyInput,
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::EmptyInput => write!(f, "Input image has zero width or height"),
            ScaleError::BufferTooSmall => write!(f, "Buffer too small for the planned dimensions"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Resampling filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Picks existing source pixels; keeps the palette intact.
    Nearest,
    /// Smooth 2-tap convolution.
    Bilinear,
}

impl Filter {
    fn to_alg(self) -> ResizeAlg {
        match self {
            Filter::Nearest => ResizeAlg::Nearest,
            Filter::Bilinear => ResizeAlg::Convolution(fir::FilterType::Bilinear),
        }
    }
}

/// Main scaling entry point.
/// `dst` must hold at least `plan.out.w * plan.out.h * 3` bytes.
pub fn scale_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    src: Size,
    plan: &ScalePlan,
    dst: &mut [u8],
    filter: Filter,
) -> Result<(), ScaleError> {
    if src.w == 0 || src.h == 0 {
        return Err(ScaleError::EmptyInput);
    }
    let src_len = (src.w as usize) * (src.h as usize) * 3;
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 3;
    if src_rgb.len() < src_len || dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, &src_rgb[..src_len])?;
    let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;

    let opts = ResizeOptions::new().resize_alg(filter.to_alg());
    resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;
    Ok(())
}

/// Resize into a freshly allocated buffer.
///
/// Identity plans return a copy of the source without touching the resizer.
pub fn resize_rgb(
    src_rgb: &[u8],
    src: Size,
    plan: &ScalePlan,
    filter: Filter,
) -> Result<Vec<u8>, ScaleError> {
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 3;
    if plan.is_identity() {
        if src.w == 0 || src.h == 0 {
            return Err(ScaleError::EmptyInput);
        }
        return src_rgb
            .get(..dst_len)
            .map(<[u8]>::to_vec)
            .ok_or(ScaleError::BufferTooSmall);
    }
    let mut dst = vec![0u8; dst_len];
    let mut resizer = Resizer::new();
    scale_rgb_cpu(&mut resizer, src_rgb, src, plan, &mut dst, filter)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{build_plan, AspectMode, ScaleTarget};

    fn checker(w: u32, h: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                buf.extend_from_slice(&[v, v, v]);
            }
        }
        buf
    }

    #[test]
    fn nearest_keeps_palette() {
        let src = Size { w: 40, h: 40 };
        let plan = build_plan(src, ScaleTarget::Exact(Size::square(13)), AspectMode::Distort);
        let out = resize_rgb(&checker(40, 40), src, &plan, Filter::Nearest).unwrap();
        assert_eq!(out.len(), 13 * 13 * 3);
        assert!(out.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn rejects_empty_input() {
        let src = Size { w: 0, h: 10 };
        let plan = build_plan(src, ScaleTarget::Exact(Size::square(5)), AspectMode::Distort);
        assert!(matches!(
            resize_rgb(&[], src, &plan, Filter::Bilinear),
            Err(ScaleError::EmptyInput)
        ));
    }

    #[test]
    fn rejects_short_destination() {
        let src = Size { w: 4, h: 4 };
        let plan = build_plan(src, ScaleTarget::Exact(Size::square(2)), AspectMode::Distort);
        let mut dst = vec![0u8; 3];
        let mut resizer = Resizer::new();
        let err = scale_rgb_cpu(&mut resizer, &checker(4, 4), src, &plan, &mut dst, Filter::Nearest);
        assert!(matches!(err, Err(ScaleError::BufferTooSmall)));
    }
}
