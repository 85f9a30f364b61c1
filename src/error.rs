//! # Error Handling
//!
//! Typed errors for the analyzer, with the metadata each failure path needs to
//! decide between aborting and degrading.
//!
//! ## Propagation Policy
//!
//! - **Fatal**: an undecodable image aborts the analysis before any metric is
//!   computed ([`AnalysisError::InvalidImage`]). Invalid configuration is fatal
//!   at startup.
//! - **Recoverable**: every OCR failure (network, status, malformed body,
//!   timeout) is recovered by the pipeline, which substitutes empty text and
//!   records a warning.
//! - **Per-feature degenerate input** is not an error at all: analyzers return
//!   `None` for the one feature they cannot define.
//!
//! ## Usage
//!
//! ```rust
//! use sosmed_insight::error::{AnalysisError, Recoverable, Retryable};
//!
//! let error = AnalysisError::ocr_status(503, "service unavailable")
//!     .with_context("uploading post image")
//!     .with_recovery_suggestion("retry later or run with --no-ocr");
//!
//! assert!(error.is_recoverable());
//! assert!(error.is_retryable());
//! ```

use std::{error::Error as StdError, fmt};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Warnings that leave the result usable
    Warning,
    /// Errors that affect operation but can be recovered from
    Error,
    /// Fatal errors that cannot be recovered from
    Fatal,
}

/// Core error context containing metadata about where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            retryable: false,
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// Base error type for the analyzer
#[derive(Debug)]
pub enum AnalysisError {
    /// Input bytes could not be decoded into an RGB raster
    InvalidImage {
        reason: String,
        context: ErrorContext,
    },
    /// Configuration loading errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Configuration/value validation errors
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// OCR endpoint unreachable or the transfer failed
    OcrNetwork {
        endpoint: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// OCR endpoint answered with a non-success status
    OcrStatus {
        status: u16,
        body: String,
        context: ErrorContext,
    },
    /// OCR response did not carry the expected fields
    OcrMalformed {
        reason: String,
        context: ErrorContext,
    },
    /// Timeout errors
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },
    /// Image processing errors (resampling, encoding)
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl AnalysisError {
    /// Create an invalid-image error
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Create an OCR network error
    pub fn ocr_network(
        endpoint: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::OcrNetwork {
            endpoint: endpoint.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create an OCR status error
    pub fn ocr_status(status: u16, body: impl Into<String>) -> Self {
        Self::OcrStatus {
            status,
            body: body.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create an OCR malformed-response error
    pub fn ocr_malformed(reason: impl Into<String>) -> Self {
        Self::OcrMalformed {
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an external library error
    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error refers to
    pub fn with_path(mut self, p: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(p.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Mark as retryable
    pub fn retryable(mut self) -> Self {
        self.context_mut().retryable = true;
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InvalidImage { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::OcrNetwork { context, .. } => context,
            Self::OcrStatus { context, .. } => context,
            Self::OcrMalformed { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InvalidImage { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::OcrNetwork { context, .. } => context,
            Self::OcrStatus { context, .. } => context,
            Self::OcrMalformed { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidImage { .. } => "invalid_image",
            Self::Config { .. } => "config",
            Self::Validation { .. } => "validation",
            Self::OcrNetwork { .. } => "ocr_network",
            Self::OcrStatus { .. } => "ocr_status",
            Self::OcrMalformed { .. } => "ocr_malformed",
            Self::Timeout { .. } => "timeout",
            Self::Processing { .. } => "processing",
            Self::Io { .. } => "io",
            Self::External { .. } => "external",
        }
    }

    /// True for failures produced by the OCR collaborator
    pub fn is_ocr_failure(&self) -> bool {
        matches!(
            self,
            Self::OcrNetwork { .. }
                | Self::OcrStatus { .. }
                | Self::OcrMalformed { .. }
                | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidImage { reason, .. } => {
                write!(f, "Invalid image: {}", reason)
            }
            AnalysisError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            AnalysisError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {})",
                    field, constraint, value
                )
            }
            AnalysisError::OcrNetwork {
                endpoint, source, ..
            } => match source {
                Some(source) => write!(f, "OCR request to {} failed: {}", endpoint, source),
                None => write!(f, "OCR request to {} failed", endpoint),
            },
            AnalysisError::OcrStatus { status, body, .. } => {
                write!(f, "OCR service returned status {}: {}", status, body)
            }
            AnalysisError::OcrMalformed { reason, .. } => {
                write!(f, "OCR response malformed: {}", reason)
            }
            AnalysisError::Timeout {
                operation,
                duration_ms,
                ..
            } => {
                write!(f, "Timeout during {} after {}ms", operation, duration_ms)
            }
            AnalysisError::Processing {
                operation, reason, ..
            } => {
                write!(f, "Processing failed during {}: {}", operation, reason)
            }
            AnalysisError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            AnalysisError::External {
                library, source, ..
            } => {
                write!(f, "External library error in {}: {}", library, source)
            }
        }
    }
}

impl StdError for AnalysisError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            Self::OcrNetwork {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type SosmedResult<T> = Result<T, AnalysisError>;

/// Trait for errors that can be retried
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;

    /// Get the recommended retry delay in milliseconds
    fn retry_delay_ms(&self) -> Option<u64> {
        None
    }
}

impl Retryable for AnalysisError {
    fn is_retryable(&self) -> bool {
        self.context().retryable
            || matches!(self, Self::OcrNetwork { .. } | Self::Timeout { .. })
            || matches!(self, Self::OcrStatus { status, .. } if *status == 429 || *status >= 500)
    }

    fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            Self::OcrNetwork { .. } => Some(500),
            Self::OcrStatus { .. } => Some(1000),
            Self::Timeout { .. } => Some(250),
            _ => None,
        }
    }
}

/// Trait for errors that can be recovered from
pub trait Recoverable {
    /// Check if this error can be recovered from
    fn is_recoverable(&self) -> bool;

    /// Get the recovery strategy for this error
    fn recovery_strategy(&self) -> Option<RecoveryStrategy>;
}

/// Recovery strategies for handling errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Continue with a documented default value
    Default { description: String },
    /// Skip the current operation
    Skip { reason: String },
}

impl Recoverable for AnalysisError {
    fn is_recoverable(&self) -> bool {
        self.is_ocr_failure() || matches!(self, Self::Processing { .. })
    }

    fn recovery_strategy(&self) -> Option<RecoveryStrategy> {
        if self.is_ocr_failure() {
            return Some(RecoveryStrategy::Default {
                description: "continue with empty text and no word boxes".to_string(),
            });
        }
        match self {
            Self::Processing { operation, .. } => Some(RecoveryStrategy::Skip {
                reason: format!("skip {}", operation),
            }),
            _ => None,
        }
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for AnalysisError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for AnalysisError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Check if an error is fatal to the analysis
    pub fn is_fatal(error: &AnalysisError) -> bool {
        matches!(
            error,
            AnalysisError::InvalidImage { .. }
                | AnalysisError::Config { .. }
                | AnalysisError::Validation { .. }
        ) || error.severity() == ErrorSeverity::Fatal
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(error: serde_json::Error) -> Self {
        Self::ocr_malformed(error.to_string())
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(error: toml::de::Error) -> Self {
        Self::config("<file>", "", error.to_string())
    }
}

impl From<sosmed_scale::cpu::ScaleError> for AnalysisError {
    fn from(error: sosmed_scale::cpu::ScaleError) -> Self {
        Self::processing("resample", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_is_fatal() {
        let error = AnalysisError::invalid_image("not a PNG or JPEG stream");
        assert_eq!(error.category(), "invalid_image");
        assert!(classify::is_fatal(&error));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_ocr_failures_degrade() {
        for error in [
            AnalysisError::ocr_status(500, "boom"),
            AnalysisError::ocr_malformed("ParsedResults missing"),
            AnalysisError::timeout("ocr", 15_000),
        ] {
            assert!(error.is_ocr_failure());
            assert!(error.is_recoverable());
            assert!(matches!(
                error.recovery_strategy(),
                Some(RecoveryStrategy::Default { .. })
            ));
            assert_eq!(error.severity(), ErrorSeverity::Warning);
        }
    }

    #[test]
    fn test_retry_policy_by_status() {
        assert!(AnalysisError::ocr_status(503, "").is_retryable());
        assert!(AnalysisError::ocr_status(429, "").is_retryable());
        assert!(!AnalysisError::ocr_status(403, "bad key").is_retryable());
        assert!(AnalysisError::ocr_status(403, "").retryable().is_retryable());
        assert_eq!(AnalysisError::timeout("ocr", 1).retry_delay_ms(), Some(250));
    }

    #[test]
    fn test_error_with_context() {
        let error = AnalysisError::processing("resample", "zero-sized plan")
            .with_context("dominant color downsample")
            .with_recovery_suggestion("check input dimensions");

        assert_eq!(error.category(), "processing");
        assert_eq!(error.recovery_suggestion(), Some("check input dimensions"));
        assert_eq!(
            error.context().context.as_deref(),
            Some("dominant color downsample")
        );
    }

    #[test]
    fn test_malformed_json_maps_to_ocr_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: AnalysisError = json_err.into();
        assert_eq!(error.category(), "ocr_malformed");
    }

    #[test]
    fn test_io_error_path_display() {
        let error = AnalysisError::io(
            "read image",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        )
        .with_path("post.png");
        assert!(error.to_string().contains("post.png"));
        assert!(error.source().is_some());
    }
}
