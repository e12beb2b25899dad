//! Google Cloud Vision `TEXT_DETECTION` backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::InferenceError;
use crate::types::{AnnotateRequest, AnnotateResponse};
use crate::{Result, VisionBackend};

const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Backend for the Cloud Vision annotate endpoint.
///
/// The service takes no instruction; the instruction argument is ignored.
#[derive(Clone)]
pub struct CloudVisionBackend {
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl CloudVisionBackend {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InferenceError::Config("API key is empty".into()));
        }

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        let http_client = builder
            .build()
            .map_err(|e| InferenceError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Override the annotate endpoint (proxies, emulators).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl VisionBackend for CloudVisionBackend {
    async fn recognize_text(
        &self,
        image_base64: &str,
        _mime_type: &str,
        _instruction: &str,
    ) -> Result<String> {
        debug!("Sending TEXT_DETECTION request ({} base64 bytes)", image_base64.len());

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&AnnotateRequest::text_detection(image_base64))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("annotate response: {}", e)))?;

        if let Some(message) = parsed.error_message() {
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }

        match parsed.full_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(InferenceError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "cloud-vision"
    }
}
