//! Inference backend implementations.

pub mod openai;
pub mod vision;

use async_trait::async_trait;

use crate::Result;

/// A remote service that recognizes text in an image.
///
/// Implementations issue exactly one request per call. Retrying or falling
/// back is the caller's decision.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Recognize all text in a base64-encoded image.
    ///
    /// # Arguments
    /// * `image_base64` - Encoded image bytes (no data-URL prefix)
    /// * `mime_type` - Media type of the image, e.g. `image/png`
    /// * `instruction` - Natural-language instruction for services that take one
    async fn recognize_text(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// A remote text-generation service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a single-turn prompt and return the raw text of the answer.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
