//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
///
/// Only failures the caller has to act on end up here. Remote OCR and
/// categorization failures are absorbed by their fallbacks and never surface.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Manual-entry input was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The expense store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from the remote text-extraction step.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No usable credential is configured.
    #[error("OCR credential missing or malformed")]
    Credential,

    /// No remote backend is configured.
    #[error("no OCR backend configured")]
    NoBackend,

    /// The remote call failed.
    #[error("OCR service failed: {0}")]
    Service(#[from] rcpt_inference::InferenceError),

    /// The remote call exceeded the pipeline timeout.
    #[error("OCR service timed out after {0}s")]
    Timeout(u64),
}

/// Errors from the remote categorization step.
#[derive(Error, Debug)]
pub enum CategorizationError {
    /// No usable credential is configured.
    #[error("categorization credential missing or malformed")]
    Credential,

    /// No remote backend is configured.
    #[error("no categorization backend configured")]
    NoBackend,

    /// The remote call failed.
    #[error("categorization service failed: {0}")]
    Service(#[from] rcpt_inference::InferenceError),

    /// The remote call exceeded the pipeline timeout.
    #[error("categorization service timed out after {0}s")]
    Timeout(u64),

    /// The service answered with something that is not the expected JSON.
    #[error("failed to parse categorization response: {0}")]
    Parse(String),
}

/// Errors related to manual-entry validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No line items were supplied.
    #[error("at least one line item is required")]
    NoLineItems,

    /// A line item has a blank name.
    #[error("line item {0} has no name")]
    BlankItemName(usize),

    /// An amount is negative.
    #[error("{field} must not be negative: {value}")]
    NegativeAmount { field: String, value: String },

    /// The category does not resolve to a known label.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Amounts add up to more than a decimal can hold.
    #[error("{0} overflows")]
    AmountOverflow(&'static str),

    /// A value could not be parsed.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Errors related to expense persistence.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing key-value capability failed to read.
    #[error("failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    /// The backing key-value capability failed to write.
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    /// The stored blob is not a valid expense collection.
    #[error("stored data under {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the collection failed.
    #[error("failed to serialize expenses: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
