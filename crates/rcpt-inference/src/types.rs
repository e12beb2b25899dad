//! Wire types for the remote services.

use serde::{Deserialize, Serialize};

/// Chat completion request (OpenAI-compatible).
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message carrying an instruction and one inline image.
    pub fn user_with_image(
        instruction: impl Into<String>,
        mime_type: &str,
        image_base64: &str,
    ) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: instruction.into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, image_base64),
                    },
                },
            ]),
        }
    }
}

/// Message content: either a bare string or typed parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One typed content part.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Error payload returned by OpenAI-compatible services.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// Cloud Vision `images:annotate` request.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotateImageRequest {
    pub image: VisionImage,
    pub features: Vec<VisionFeature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisionImage {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub max_results: u32,
}

impl AnnotateRequest {
    /// Single-image TEXT_DETECTION request.
    pub fn text_detection(image_base64: &str) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: image_base64.to_string(),
                },
                features: vec![VisionFeature {
                    feature_type: "TEXT_DETECTION".to_string(),
                    max_results: 1,
                }],
            }],
        }
    }
}

/// Cloud Vision `images:annotate` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    pub error: Option<VisionStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionStatus {
    #[serde(default)]
    pub message: String,
}

impl AnnotateResponse {
    /// The full-text annotation of the first image (the first entry is the
    /// whole detected block; later entries are individual words).
    pub fn full_text(&self) -> Option<&str> {
        self.responses
            .first()
            .and_then(|r| r.text_annotations.first())
            .map(|a| a.description.as_str())
    }

    /// Per-image error message, if the service reported one.
    pub fn error_message(&self) -> Option<&str> {
        self.responses
            .first()
            .and_then(|r| r.error.as_ref())
            .map(|e| e.message.as_str())
    }
}
