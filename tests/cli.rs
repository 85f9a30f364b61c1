//! Binary and config-file tests.

mod common;

use std::process::Command;

use common::test_images::{self, WHITE};
use sosmed_insight::{AnalysisConfig, ScoringProfile};

fn sosmed() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sosmed"));
    cmd.env_remove("OCR_SPACE_API_KEY").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sosmed.toml");
    std::fs::write(
        &path,
        r#"
profile = "three-factor"

[thresholds]
contrast_min = 12.5

[kmeans]
k = 4

[text]
keywords = ["buy", "click"]
"#,
    )
    .unwrap();

    let config = AnalysisConfig::load(&path).unwrap();
    assert_eq!(config.profile, ScoringProfile::ThreeFactor);
    assert_eq!(config.thresholds.contrast_min, 12.5);
    assert_eq!(config.thresholds.luminance_max, 220.0);
    assert_eq!(config.kmeans.k, 4);
    assert_eq!(config.kmeans.seed, 42);
    assert_eq!(config.text.keywords, vec!["buy", "click"]);
}

#[test]
fn invalid_config_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "profile = [").unwrap();
    assert_eq!(AnalysisConfig::load(&broken).unwrap_err().category(), "config");

    let out_of_range = dir.path().join("range.toml");
    std::fs::write(&out_of_range, "[thresholds]\nspectrum_min = 9\nspectrum_max = 3\n").unwrap();
    assert_eq!(
        AnalysisConfig::load(&out_of_range).unwrap_err().category(),
        "validation"
    );

    let missing = dir.path().join("missing.toml");
    assert_eq!(AnalysisConfig::load(&missing).unwrap_err().category(), "io");
}

#[test]
fn binary_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("post.png");
    let img = test_images::squares(200, 200, WHITE, &[(20, 20, 50), (120, 120, 50)]);
    std::fs::write(&image, test_images::png(&img)).unwrap();

    let output = sosmed().arg(&image).arg("--no-ocr").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["width"], 200);
    assert_eq!(json["features"]["object_count"], 2);
    assert_eq!(json["text"]["has_cta"], false);
    assert_eq!(json["engagement"]["max_points"], 5);
}

#[test]
fn binary_without_credential_warns() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("post.png");
    std::fs::write(&image, test_images::png(&test_images::noise(64, 64, 9))).unwrap();

    let output = sosmed()
        .arg(&image)
        .args(["--profile", "three-factor"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["engagement"]["profile"], "three-factor");
    let warnings = json["warnings"].as_array().unwrap();
    assert!(warnings[0].as_str().unwrap().contains("OCR_SPACE_API_KEY"));
}

#[test]
fn binary_text_format() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("post.png");
    std::fs::write(&image, test_images::png(&test_images::mirrored(80, 40))).unwrap();

    let output = sosmed()
        .arg(&image)
        .args(["--no-ocr", "--format", "text"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Image: 80x40"));
    assert!(stdout.contains("Recommendations"));
    assert!(stdout.contains("no text detected"));
}

#[test]
fn binary_rejects_non_image() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.png");
    std::fs::write(&file, "just some text").unwrap();

    let output = sosmed().arg(&file).arg("--no-ocr").output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid image"));
}
