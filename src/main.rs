use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sosmed_insight::config::{AnalysisConfig, OcrConfig, ScoringProfile};
use sosmed_insight::error::classify;
use sosmed_insight::text::{NoopExtractor, OcrSpaceClient, TextExtractor};
use sosmed_insight::{Pipeline, report};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Social-media post image analyzer:
/// - color, layout and text metrics for one JPEG/PNG
/// - heuristic engagement label with recommendations
#[derive(Parser, Debug)]
#[command(name = "sosmed")]
#[command(about = "Analyze a social-media post image and estimate its engagement potential")]
#[command(long_about = "Analyze a social-media post image: dominant color, color spectrum, contrast, \
edges, whitespace, objects, symmetry and OCR text signals, combined into a heuristic engagement \
label with ordered recommendations.

The OCR.space credential is read from the OCR_SPACE_API_KEY environment variable \
or the ocr.api_key entry of the config file.")]
struct Args {
    /// Image to analyze (JPEG or PNG)
    #[arg(help = "Path to the JPEG or PNG image")]
    image: PathBuf,

    /// Scoring profile
    #[arg(short, long, value_enum,
          help = "Scoring profile: five-factor (default) or three-factor")]
    profile: Option<ScoringProfile>,

    /// TOML configuration file
    #[arg(short, long, help = "TOML file overriding thresholds, sizes and OCR settings")]
    config: Option<PathBuf>,

    /// Skip text extraction
    #[arg(long, help = "Skip OCR; text signals stay empty")]
    no_ocr: bool,

    /// OCR language code
    #[arg(short, long, help = "OCR.space language code, e.g. ind or eng")]
    language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    let (extractor, notice) = select_extractor(&config, args.no_ocr)?;
    let pipeline = Pipeline::new(config, extractor)?;

    let mut result = match pipeline.analyze_path(&args.image).await {
        Ok(result) => result,
        Err(e) => {
            if classify::is_fatal(&e) {
                error!(category = e.category(), "analysis aborted");
            }
            return Err(e).with_context(|| format!("analyzing {}", args.image.display()));
        }
    };
    if let Some(notice) = notice {
        result.warnings.push(notice);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", report::render_summary(&result)),
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file (or defaults), then CLI overrides, then the credential.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }
    config.ocr.resolve_api_key_from_env();
    config.validate()?;
    Ok(config)
}

fn select_extractor(
    config: &AnalysisConfig,
    no_ocr: bool,
) -> Result<(Arc<dyn TextExtractor>, Option<String>)> {
    if no_ocr {
        return Ok((Arc::new(NoopExtractor), None));
    }
    if config.ocr.api_key.is_none() {
        let notice = format!(
            "text extraction disabled: {} is not set",
            OcrConfig::API_KEY_ENV
        );
        warn!("{notice}");
        return Ok((Arc::new(NoopExtractor), Some(notice)));
    }
    Ok((Arc::new(OcrSpaceClient::new(config.ocr.clone())?), None))
}
