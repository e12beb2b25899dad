//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::credentials::CredentialRules;

/// Main configuration for the rcpt pipeline.
///
/// API keys never live in this file; each remote section names the
/// environment variable that holds its key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Text extraction (OCR) configuration.
    pub ocr: OcrConfig,

    /// Remote categorization configuration.
    pub categorization: CategorizationConfig,

    /// Local field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Expense store configuration.
    pub store: StoreConfig,
}

/// Remote OCR provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrProvider {
    /// Chat completions with an image attachment.
    #[default]
    OpenAi,
    /// Google Cloud Vision `TEXT_DETECTION`.
    CloudVision,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Which remote provider to call.
    pub provider: OcrProvider,

    /// Environment variable holding the provider API key.
    pub api_key_env: String,

    /// Model name (OpenAI provider only).
    pub model: String,

    /// Override for the provider base URL.
    pub base_url: Option<String>,

    /// Key shape override; the provider's rules apply when unset.
    pub key_rules: Option<CredentialRules>,

    /// Upper bound for the remote call, in seconds.
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            provider: OcrProvider::OpenAi,
            api_key_env: "RCPT_OCR_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            key_rules: None,
            timeout_secs: 30,
        }
    }
}

impl OcrConfig {
    /// Credential rules for the configured provider.
    pub fn credential_rules(&self) -> CredentialRules {
        self.key_rules.clone().unwrap_or_else(|| match self.provider {
            OcrProvider::OpenAi => CredentialRules::openai(),
            OcrProvider::CloudVision => CredentialRules::google_cloud(),
        })
    }
}

/// Remote categorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizationConfig {
    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Model name.
    pub model: String,

    /// Override for the API base URL.
    pub base_url: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Response token limit.
    pub max_tokens: u32,

    /// Key shape override; OpenAI rules apply when unset.
    pub key_rules: Option<CredentialRules>,

    /// Upper bound for the remote call, in seconds.
    pub timeout_secs: u64,
}

impl Default for CategorizationConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            temperature: 0.3,
            max_tokens: 500,
            key_rules: None,
            timeout_secs: 30,
        }
    }
}

impl CategorizationConfig {
    pub fn credential_rules(&self) -> CredentialRules {
        self.key_rules.clone().unwrap_or_else(CredentialRules::openai)
    }
}

/// Which amount pattern the normalizer uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountMode {
    /// Any digit run, optionally `$`-prefixed, with up to two decimals.
    /// Picks up store numbers, zip codes and date parts too.
    Lenient,
    /// Only `$`-prefixed numbers or numbers with exactly two decimals.
    #[default]
    Strict,
}

/// Local field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Amount pattern used by the normalizer.
    pub amount_mode: AmountMode,

    /// Maximum number of line items the rule-based path keeps.
    pub max_line_items: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            amount_mode: AmountMode::Strict,
            max_line_items: 10,
        }
    }
}

/// Expense store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the file-backed key-value store.
    pub data_dir: PathBuf,

    /// Key under which the expense collection is stored.
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("rcpt-data"),
            key: "expenses".to_string(),
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
