//! OpenAI-compatible chat completion backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::error::InferenceError;
use crate::types::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse};
use crate::{CompletionBackend, Result, VisionBackend};

/// Settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            temperature: Some(0.3),
            max_tokens: Some(500),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Backend speaking the `/chat/completions` protocol.
///
/// Serves both as a text recognizer (image sent as a data URL next to the
/// instruction) and as a plain completion service.
#[derive(Clone)]
pub struct OpenAiBackend {
    http_client: Client,
    settings: OpenAiSettings,
}

impl OpenAiBackend {
    /// Build a backend; fails on an empty key or if the HTTP client cannot be built.
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(InferenceError::Config("API key is empty".into()));
        }

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(settings.timeout);
        let http_client = builder
            .build()
            .map_err(|e| InferenceError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    async fn chat(&self, message: ChatMessage) -> Result<String> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![message],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(model = %self.settings.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.settings.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Some gateways answer 200 with an error payload
        if let Ok(err) = serde_json::from_str::<ApiErrorBody>(&body) {
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: err.error.message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::Parse(format!("chat response: {}", e)))?;

        match parsed.first_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(InferenceError::EmptyResponse),
        }
    }
}

#[async_trait]
impl VisionBackend for OpenAiBackend {
    async fn recognize_text(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String> {
        self.chat(ChatMessage::user_with_image(instruction, mime_type, image_base64))
            .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(ChatMessage::user(prompt)).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
