//! Receipt text extraction.

mod engine;
pub mod synthetic;

pub use engine::{DEFAULT_TIMEOUT, OCR_INSTRUCTION, OcrEngine, OcrEngineBuilder};
pub use synthetic::{FastRandSource, FixedSource, RandomSource, SyntheticReceiptGenerator};

use serde::{Deserialize, Serialize};

use crate::models::ExtractionSource;

/// Raw text of a receipt and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Verbatim (or synthetic) receipt text.
    pub text: String,

    /// Remote service or synthetic fallback.
    pub source: ExtractionSource,
}

impl ExtractedText {
    pub fn is_fallback(&self) -> bool {
        self.source == ExtractionSource::Fallback
    }
}
