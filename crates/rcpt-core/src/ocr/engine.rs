//! Text extraction engine: one remote call, synthetic fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rcpt_inference::{InferenceError, VisionBackend};
use tracing::{debug, info, warn};

use crate::credentials::CredentialRules;
use crate::error::ExtractionError;
use crate::models::{ExtractionSource, ImagePayload};

use super::synthetic::{RandomSource, SyntheticReceiptGenerator};
use super::ExtractedText;

/// Instruction sent alongside the image.
pub const OCR_INSTRUCTION: &str =
    "Extract all text from this receipt image verbatim. Preserve line breaks.";

/// Default upper bound for the remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Receipt text extraction engine.
pub struct OcrEngine {
    backend: Option<Arc<dyn VisionBackend>>,
    credential: Option<String>,
    rules: CredentialRules,
    timeout: Duration,
    synthetic: SyntheticReceiptGenerator,
}

/// Builder for OcrEngine.
pub struct OcrEngineBuilder {
    backend: Option<Arc<dyn VisionBackend>>,
    credential: Option<String>,
    rules: CredentialRules,
    timeout: Duration,
    synthetic: SyntheticReceiptGenerator,
}

impl OcrEngineBuilder {
    /// Create a new builder with no remote backend.
    pub fn new() -> Self {
        Self {
            backend: None,
            credential: None,
            rules: CredentialRules::default(),
            timeout: DEFAULT_TIMEOUT,
            synthetic: SyntheticReceiptGenerator::default(),
        }
    }

    /// Set the remote vision backend.
    pub fn with_backend(mut self, backend: Arc<dyn VisionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the credential checked before each remote call.
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    /// Set the credential rules.
    pub fn with_credential_rules(mut self, rules: CredentialRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the remote call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the template picker used by the synthetic fallback.
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.synthetic = SyntheticReceiptGenerator::new(random);
        self
    }

    /// Build the OCR engine.
    pub fn build(self) -> OcrEngine {
        OcrEngine {
            backend: self.backend,
            credential: self.credential,
            rules: self.rules,
            timeout: self.timeout,
            synthetic: self.synthetic,
        }
    }
}

impl Default for OcrEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine {
    /// Create a new builder.
    pub fn builder() -> OcrEngineBuilder {
        OcrEngineBuilder::new()
    }

    /// Whether a remote call will be attempted.
    pub fn has_remote(&self) -> bool {
        self.backend.is_some() && self.rules.accepts_opt(self.credential.as_deref())
    }

    /// Extract text from a receipt image. Never fails.
    ///
    /// Any remote failure (bad credential, service error, empty answer,
    /// timeout) is logged and replaced by a synthetic receipt.
    pub async fn extract_text(&self, image: &ImagePayload) -> ExtractedText {
        let start = Instant::now();
        info!("Extracting text from image: {}x{}", image.width, image.height);

        match self.recognize_remote(image).await {
            Ok(text) => {
                info!(
                    "Remote OCR returned {} chars in {}ms",
                    text.len(),
                    start.elapsed().as_millis()
                );
                ExtractedText {
                    text,
                    source: ExtractionSource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, "OCR unavailable, using synthetic receipt");
                ExtractedText {
                    text: self.synthetic.generate_now(),
                    source: ExtractionSource::Fallback,
                }
            }
        }
    }

    async fn recognize_remote(&self, image: &ImagePayload) -> Result<String, ExtractionError> {
        if !self.rules.accepts_opt(self.credential.as_deref()) {
            return Err(ExtractionError::Credential);
        }
        let backend = self.backend.as_ref().ok_or(ExtractionError::NoBackend)?;

        debug!(backend = backend.name(), "Calling remote OCR");

        let text = tokio::time::timeout(
            self.timeout,
            backend.recognize_text(&image.encoded_data, &image.mime_type, OCR_INSTRUCTION),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(self.timeout.as_secs()))??;

        if text.trim().is_empty() {
            return Err(InferenceError::EmptyResponse.into());
        }

        Ok(text)
    }
}
