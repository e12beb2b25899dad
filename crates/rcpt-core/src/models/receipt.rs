//! Receipt input and intermediate representations.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A captured receipt image, as handed over by the acquisition layer.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes.
    pub binary_data: Vec<u8>,

    /// Base64 encoding of `binary_data`.
    pub encoded_data: String,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Media type of the image bytes.
    pub mime_type: String,

    /// Where the image lives (file path, content URI); stored on the record.
    pub uri: Option<String>,
}

/// Media type assumed when the acquisition layer does not say.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

impl ImagePayload {
    /// Build a payload from raw bytes, computing the base64 encoding.
    pub fn from_bytes(binary_data: Vec<u8>, width: u32, height: u32) -> Self {
        let encoded_data = STANDARD.encode(&binary_data);
        Self {
            binary_data,
            encoded_data,
            width,
            height,
            mime_type: DEFAULT_IMAGE_MIME.to_string(),
            uri: None,
        }
    }

    /// Set the media type, e.g. `image/png`.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Attach a reference to the image's origin.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// Canonical form of OCR text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReceipt {
    /// Cleaned full text.
    pub full_text: String,

    /// Currency-like amounts in order of appearance.
    pub amounts: Vec<Decimal>,

    /// First up-to-three lines joined by a space.
    pub merchant_info: String,

    /// Non-empty lines longer than two characters.
    pub lines: Vec<String>,
}

impl NormalizedReceipt {
    /// Largest detected amount, or zero.
    pub fn max_amount(&self) -> Decimal {
        self.amounts.iter().copied().max().unwrap_or(Decimal::ZERO)
    }
}
