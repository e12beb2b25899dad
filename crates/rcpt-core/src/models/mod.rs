//! Data models for receipts, expenses and configuration.

pub mod config;
pub mod expense;
pub mod receipt;

pub use config::{
    AmountMode, CategorizationConfig, ExtractionConfig, OcrConfig, OcrProvider, RcptConfig,
    StoreConfig,
};
pub use expense::{CategoryLabel, ExpenseFields, ExpenseRecord, ExtractionSource, ProcessedBy};
pub use receipt::{DEFAULT_IMAGE_MIME, ImagePayload, NormalizedReceipt};
