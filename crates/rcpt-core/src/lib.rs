//! Core library for receipt-to-expense processing.
//!
//! This crate provides:
//! - Text extraction from receipt images, with a synthetic fallback receipt
//! - Text normalization (cleaning, line splitting, amount extraction)
//! - Categorization through a completion service or local keyword rules
//! - An expense store over a pluggable key-value capability
//! - Manual expense entry and the end-to-end receipt pipeline

pub mod credentials;
pub mod error;
pub mod manual;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod receipt;
pub mod store;

pub use error::{RcptError, Result};
pub use manual::{LineItemInput, ManualEntry, record_manual_entry};
pub use models::{
    AmountMode, CategoryLabel, ExpenseFields, ExpenseRecord, ExtractionSource, ImagePayload,
    NormalizedReceipt, ProcessedBy, RcptConfig,
};
pub use ocr::{ExtractedText, OcrEngine};
pub use pipeline::{ProcessedReceipt, ReceiptPipeline};
pub use receipt::{HybridCategorizer, Normalizer, RuleBasedCategorizer};
#[cfg(feature = "native")]
pub use store::FileKv;
pub use store::{ExpenseQuery, ExpenseStore, KeyLock, KeyValueStore, MemoryKv};

/// Re-export remote backend types.
pub use rcpt_inference::{CompletionBackend, InferenceError, VisionBackend};

#[cfg(feature = "native")]
pub use rcpt_inference::{CloudVisionBackend, OpenAiBackend};
