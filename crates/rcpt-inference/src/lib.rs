//! Remote inference backends for rcpt.
//!
//! This crate provides a unified interface for the two remote services the
//! receipt pipeline talks to:
//! - a vision service that turns a receipt image into raw text
//! - a completion service that turns a structured prompt into JSON text
//!
//! Backends are plain HTTP clients; the pipeline decides when to call them and
//! what to do when they fail.

mod backend;
mod error;
pub mod types;

pub use backend::{CompletionBackend, VisionBackend};
pub use backend::openai::{OpenAiBackend, OpenAiSettings};
pub use backend::vision::CloudVisionBackend;
pub use error::InferenceError;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
