//! OCR collaborator and the text signals derived from its output.

pub mod ocr;
pub mod signals;

pub use ocr::{NoopExtractor, OcrOutput, OcrSpaceClient, TextExtractor};
pub use signals::{ENGLISH_CTA_KEYWORDS, INDONESIAN_CTA_KEYWORDS, TextSignalExtractor};
