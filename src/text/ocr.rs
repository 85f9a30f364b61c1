//! # OCR Collaborator
//!
//! [`TextExtractor`] sits between the pipeline and whatever reads text off the
//! image. [`OcrSpaceClient`] talks to the OCR.space HTTP API and
//! [`NoopExtractor`] stands in when OCR is disabled.
//!
//! Word boxes come back in the coordinates of the uploaded canvas and are
//! mapped to source-image pixels before they leave this module.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::core::WordBox;
use crate::core::image_ops::clamp_long_side;
use crate::error::{AnalysisError, Retryable, SosmedResult};

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_CHARS: usize = 512;

/// Raw collaborator output: text plus optional word boxes in source pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub word_boxes: Option<Vec<WordBox>>,
}

/// Reads text from an RGB image.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &RgbImage) -> SosmedResult<OcrOutput>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Returns no text. Used with `--no-ocr` or without a credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

#[async_trait]
impl TextExtractor for NoopExtractor {
    async fn extract_text(&self, _image: &RgbImage) -> SosmedResult<OcrOutput> {
        Ok(OcrOutput::default())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
    #[serde(default)]
    text_overlay: Option<TextOverlay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextOverlay {
    #[serde(default)]
    lines: Vec<OverlayLine>,
    #[serde(default)]
    has_overlay: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OverlayLine {
    #[serde(default)]
    words: Vec<OverlayWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OverlayWord {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

/// `ErrorMessage` is a string or a list of strings depending on the failure.
fn error_text(message: Option<&Value>) -> String {
    match message {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => "no error message".to_string(),
    }
}

/// Parse an OCR.space response body. `scale` maps upload pixels back to
/// source pixels.
pub fn parse_response(body: &str, scale: (f64, f64)) -> SosmedResult<OcrOutput> {
    let response: OcrSpaceResponse = serde_json::from_str(body)?;
    if response.is_errored_on_processing {
        return Err(AnalysisError::ocr_malformed(format!(
            "service reported a processing error: {}",
            error_text(response.error_message.as_ref())
        )));
    }

    let first = response
        .parsed_results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AnalysisError::ocr_malformed("response has no ParsedResults"))?;

    let word_boxes = first
        .text_overlay
        .filter(|overlay| overlay.has_overlay.unwrap_or(true) || !overlay.lines.is_empty())
        .map(|overlay| {
            overlay
                .lines
                .iter()
                .flat_map(|line| line.words.iter())
                .map(|w| {
                    WordBox {
                        left: w.left,
                        top: w.top,
                        width: w.width,
                        height: w.height,
                    }
                    .scaled(scale.0, scale.1)
                })
                .collect::<Vec<_>>()
        });

    let text = first
        .parsed_text
        .ok_or_else(|| AnalysisError::ocr_malformed("first result has no ParsedText"))?;
    Ok(OcrOutput { text, word_boxes })
}

fn clip(body: String) -> String {
    if body.chars().count() <= ERROR_BODY_CHARS {
        body
    } else {
        body.chars().take(ERROR_BODY_CHARS).collect()
    }
}

/// OCR.space HTTP client.
pub struct OcrSpaceClient {
    http: reqwest::Client,
    config: OcrConfig,
    api_key: String,
}

impl std::fmt::Debug for OcrSpaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrSpaceClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OcrSpaceClient {
    /// Build a client; fails when `config.api_key` is unset or blank.
    pub fn new(config: OcrConfig) -> SosmedResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::config("ocr.api_key", "<unset>", "no OCR.space credential")
                    .with_recovery_suggestion(format!(
                        "export {} or set ocr.api_key in the config file",
                        OcrConfig::API_KEY_ENV
                    ))
            })?;
        let http = reqwest::Client::builder()
            .timeout(config.attempt_timeout())
            .build()
            .map_err(|e| AnalysisError::external("reqwest", e))?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// JPEG data URI of the clamped upload canvas and the factors mapping
    /// canvas pixels back to source pixels.
    pub fn encode_upload(&self, image: &RgbImage) -> SosmedResult<(String, (f64, f64))> {
        let (canvas, plan) = clamp_long_side(image, self.config.upload_long_side)?;
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.config.jpeg_quality)
            .encode_image(&canvas)
            .map_err(|e| AnalysisError::external("image", e).with_operation("jpeg encode"))?;
        let data_uri = format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(&jpeg)
        );
        Ok((data_uri, plan.inverse_factors()))
    }

    fn transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::timeout("ocr request", self.config.attempt_timeout().as_millis() as u64)
        } else {
            AnalysisError::ocr_network(self.config.endpoint.clone(), e)
        }
    }

    async fn post_once(&self, data_uri: &str) -> SosmedResult<String> {
        let overlay = if self.config.overlay { "true" } else { "false" };
        let form = [
            ("base64Image", data_uri),
            ("language", self.config.language.as_str()),
            ("isOverlayRequired", overlay),
        ];
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("apikey", &self.api_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(AnalysisError::ocr_status(status.as_u16(), clip(body)));
        }
        Ok(body)
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceClient {
    async fn extract_text(&self, image: &RgbImage) -> SosmedResult<OcrOutput> {
        let (data_uri, scale) = self.encode_upload(image)?;
        debug!(bytes = data_uri.len(), language = %self.config.language, "uploading to OCR.space");

        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            let outcome = match self.post_once(&data_uri).await {
                Ok(body) => parse_response(&body, scale),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(output) => {
                    debug!(
                        chars = output.text.chars().count(),
                        boxes = output.word_boxes.as_ref().map_or(0, Vec::len),
                        "OCR.space response parsed"
                    );
                    return Ok(output);
                }
                Err(e) if attempt < self.config.retries && e.is_retryable() => {
                    let delay = Duration::from_millis(e.retry_delay_ms().unwrap_or(500));
                    // no room left for another attempt inside the overall bound
                    if started.elapsed() + delay >= self.config.timeout() {
                        return Err(e);
                    }
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "OCR request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "ocr.space"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    const OK_BODY: &str = r#"{
        "ParsedResults": [{
            "ParsedText": "BELI SEKARANG\r\nDiskon 50%\r\n",
            "TextOverlay": {
                "Lines": [
                    {"Words": [
                        {"WordText": "BELI", "Left": 10, "Top": 20, "Height": 10, "Width": 40},
                        {"WordText": "SEKARANG", "Left": 60, "Top": 20, "Height": 10, "Width": 80}
                    ]},
                    {"Words": [{"WordText": "Diskon", "Left": 10, "Top": 40, "Height": 8, "Width": 30}]}
                ],
                "HasOverlay": true
            }
        }],
        "IsErroredOnProcessing": false
    }"#;

    #[test]
    fn parses_text_and_boxes() {
        let out = parse_response(OK_BODY, (1.0, 1.0)).unwrap();
        assert!(out.text.starts_with("BELI SEKARANG"));
        let boxes = out.word_boxes.unwrap();
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[1], WordBox { left: 60.0, top: 20.0, width: 80.0, height: 10.0 });
    }

    #[test]
    fn boxes_map_back_to_source_pixels() {
        let out = parse_response(OK_BODY, (2.0, 0.5)).unwrap();
        let first = out.word_boxes.unwrap()[0];
        assert_eq!(first, WordBox { left: 20.0, top: 10.0, width: 80.0, height: 5.0 });
    }

    #[test]
    fn missing_overlay_means_no_boxes() {
        let body = r#"{"ParsedResults":[{"ParsedText":"halo"}],"IsErroredOnProcessing":false}"#;
        let out = parse_response(body, (1.0, 1.0)).unwrap();
        assert_eq!(out.text, "halo");
        assert_eq!(out.word_boxes, None);
    }

    #[test]
    fn processing_error_is_reported() {
        let body = r#"{"IsErroredOnProcessing":true,"ErrorMessage":["Invalid API key","Try again"]}"#;
        let err = parse_response(body, (1.0, 1.0)).unwrap_err();
        assert!(err.is_ocr_failure());
        assert!(err.to_string().contains("Invalid API key; Try again"));
    }

    #[test]
    fn malformed_bodies_are_ocr_failures() {
        for body in [
            "not json",
            "{}",
            r#"{"ParsedResults":[]}"#,
            r#"{"ParsedResults":[{"TextOverlay":{"Lines":[]}}]}"#,
        ] {
            let err = parse_response(body, (1.0, 1.0)).unwrap_err();
            assert!(err.is_ocr_failure(), "{body}");
        }
    }

    #[test]
    fn client_requires_a_credential() {
        let err = OcrSpaceClient::new(OcrConfig::default()).unwrap_err();
        assert_eq!(err.category(), "config");

        let blank = OcrConfig {
            api_key: Some("  ".to_string()),
            ..OcrConfig::default()
        };
        assert!(OcrSpaceClient::new(blank).is_err());
    }

    #[test]
    fn upload_is_clamped_jpeg() {
        let config = OcrConfig {
            api_key: Some("test-key".to_string()),
            upload_long_side: 100,
            ..OcrConfig::default()
        };
        let client = OcrSpaceClient::new(config).unwrap();
        let img = RgbImage::from_pixel(400, 200, image::Rgb([200, 10, 10]));
        let (uri, scale) = client.encode_upload(&img).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(scale, (4.0, 4.0));

        let decoded = general_purpose::STANDARD
            .decode(uri.trim_start_matches("data:image/jpeg;base64,"))
            .unwrap();
        let back = image::load_from_memory(&decoded).unwrap();
        assert_eq!((back.width(), back.height()), (100, 50));
    }

    #[test]
    fn client_debug_hides_key() {
        let config = OcrConfig {
            api_key: Some("secret-value".to_string()),
            ..OcrConfig::default()
        };
        let client = OcrSpaceClient::new(config).unwrap();
        assert!(!format!("{client:?}").contains("secret-value"));
    }
}
