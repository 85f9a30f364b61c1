//! # Configuration Module
//!
//! This module provides the analysis configuration: scoring profile, named
//! thresholds, working resolutions, clustering parameters, CTA keywords and
//! the OCR collaborator settings.

pub mod config;

pub use config::{
    AnalysisConfig, KMeansConfig, OcrConfig, ScoringProfile, TextConfig, Thresholds, WorkingSizes,
};
