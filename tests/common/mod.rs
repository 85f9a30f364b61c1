//! Common test utilities and helpers for the sosmed_insight tests
//!
//! Synthetic images, scripted OCR collaborators and range assertions shared
//! by the integration tests.

#![allow(dead_code)]

/// Scripted OCR collaborators
pub mod mock_ocr {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use image::RgbImage;
    use sosmed_insight::core::WordBox;
    use sosmed_insight::error::{AnalysisError, SosmedResult};
    use sosmed_insight::text::{OcrOutput, TextExtractor};

    /// What the mock does on every call
    #[derive(Debug, Clone)]
    pub enum Script {
        Text(String, Option<Vec<WordBox>>),
        Status(u16),
        Malformed,
        Hang(Duration),
    }

    /// Mock extractor that counts its calls
    pub struct MockOcr {
        script: Script,
        calls: AtomicUsize,
    }

    impl MockOcr {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn text(text: &str) -> Self {
            Self::new(Script::Text(text.to_string(), None))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextExtractor for MockOcr {
        async fn extract_text(&self, _image: &RgbImage) -> SosmedResult<OcrOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Text(text, boxes) => Ok(OcrOutput {
                    text: text.clone(),
                    word_boxes: boxes.clone(),
                }),
                Script::Status(status) => Err(AnalysisError::ocr_status(*status, "scripted")),
                Script::Malformed => Err(AnalysisError::ocr_malformed("response has no ParsedResults")),
                Script::Hang(duration) => {
                    tokio::time::sleep(*duration).await;
                    Ok(OcrOutput::default())
                }
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}

/// Synthetic test images
pub mod test_images {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    pub const WHITE: [u8; 3] = [255, 255, 255];
    pub const BLACK: [u8; 3] = [0, 0, 0];

    pub fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(color))
    }

    /// Deterministic pseudo-random noise
    pub fn noise(w: u32, h: u32, seed: u32) -> RgbImage {
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
        RgbImage::from_fn(w, h, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            };
            Rgb([next(), next(), next()])
        })
    }

    /// Left half mirrored onto the right half
    pub fn mirrored(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let mx = x.min(w - 1 - x);
            let v = ((mx * 7 + y * 3) % 200) as u8 + 30;
            Rgb([v, 255 - v, v / 2])
        })
    }

    /// Black squares `(x, y, side)` on a canvas of `background`
    pub fn squares(w: u32, h: u32, background: [u8; 3], boxes: &[(u32, u32, u32)]) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let inside = boxes
                .iter()
                .any(|&(bx, by, s)| x >= bx && x < bx + s && y >= by && y < by + s);
            if inside { Rgb(BLACK) } else { Rgb(background) }
        })
    }

    pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).expect("encode test image");
        buf.into_inner()
    }

    pub fn png(image: &RgbImage) -> Vec<u8> {
        encode(image, ImageFormat::Png)
    }
}

/// Range assertions over analysis results
pub mod assertions {
    use sosmed_insight::AnalysisResult;

    pub fn assert_in_range(name: &str, value: f64, lo: f64, hi: f64) {
        assert!(
            value.is_finite() && value >= lo && value <= hi,
            "{name} = {value} outside [{lo}, {hi}]"
        );
    }

    /// Every bounded feature lies in its documented range
    pub fn assert_feature_ranges(result: &AnalysisResult) {
        let f = &result.features;
        assert_in_range("color_diversity", f.color_diversity, 0.0, 1.0);
        assert_in_range("whitespace_ratio", f.whitespace_ratio, 0.0, 1.0);
        assert_in_range("brightness", f.brightness, 0.0, 255.0);
        assert_in_range("saturation", f.saturation, 0.0, 255.0);
        assert_in_range("complexity", f.complexity, 0.0, 1.0);
        assert_in_range("contrast", f.contrast, 0.0, 255.0);
        assert_in_range("edge_complexity", f.edge_complexity, 0.0, 1.0);
        assert_in_range("simplicity", result.text.simplicity, 0.0, 1.0);
        assert!((1..=5).contains(&f.color_spectrum_count));
        if let Some(s) = f.symmetry_score {
            assert_in_range("symmetry_score", s, -1.0, 1.0);
        }
        let e = &result.engagement;
        assert!(e.points <= e.max_points);
        assert!(e.recommendations.len() as u32 <= e.max_points);
        assert!(e.notes.len() <= 2);
    }
}
