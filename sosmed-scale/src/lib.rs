// SPDX-License-Identifier: MIT
//! # sosmed-scale: Working-Resolution Resampling for Post Analysis
//!
//! Every image metric in the analyzer is computed on a fixed working
//! resolution so that cost is bounded and results do not depend on the
//! upload size. This crate owns that step: it plans the output size and
//! resamples tightly packed RGB8 buffers on the CPU with `fast_image_resize`.
//!
//! ## Key Components
//!
//! - [`presets`]: plan computation ([`presets::build_plan`]) and the named
//!   working resolutions used by the analyzers
//! - [`cpu`]: SIMD-accelerated RGB8 resize into caller-provided or owned buffers
//!
//! ## Filters
//!
//! Palette metrics (dominant color, unique-color counts) must not invent
//! colors that were never in the source, so they resample with
//! [`cpu::Filter::Nearest`]. Shape metrics (clustering, segmentation) use
//! [`cpu::Filter::Bilinear`].
//!
//! ## Usage Example
//!
//! ```rust
//! use sosmed_scale::cpu::{resize_rgb, Filter};
//! use sosmed_scale::presets::{build_plan, AspectMode, ScaleTarget, Size};
//!
//! let src = Size { w: 4, h: 2 };
//! let pixels = vec![200u8; 4 * 2 * 3];
//! let plan = build_plan(src, ScaleTarget::Exact(Size { w: 2, h: 2 }), AspectMode::Distort);
//! let out = resize_rgb(&pixels, src, &plan, Filter::Nearest).unwrap();
//! assert_eq!(out.len(), 2 * 2 * 3);
//! assert!(out.iter().all(|&v| v == 200));
//! ```

pub mod cpu;
pub mod presets;
