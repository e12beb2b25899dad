//! Hybrid categorizer combining a remote language model with local rules.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rcpt_inference::CompletionBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credentials::CredentialRules;
use crate::error::CategorizationError;
use crate::models::{ExpenseFields, ExtractionSource, NormalizedReceipt};

use super::fallback::RuleBasedCategorizer;
use super::prompt::{build_prompt, parse_response};
use super::rules::line_items::DEFAULT_MAX_ITEMS;

/// Result of categorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    /// Extracted fields.
    pub fields: ExpenseFields,
    /// Remote model or rule-based fallback.
    pub source: ExtractionSource,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Categorizer trying one remote call before the keyword rules.
pub struct HybridCategorizer {
    backend: Option<Arc<dyn CompletionBackend>>,
    credential: Option<String>,
    rules: CredentialRules,
    timeout: Duration,
    max_line_items: usize,
    fallback: RuleBasedCategorizer,
}

impl HybridCategorizer {
    /// Create a rules-only categorizer.
    pub fn new() -> Self {
        Self {
            backend: None,
            credential: None,
            rules: CredentialRules::default(),
            timeout: Duration::from_secs(30),
            max_line_items: DEFAULT_MAX_ITEMS,
            fallback: RuleBasedCategorizer::new(),
        }
    }

    /// Set the remote completion backend.
    pub fn with_backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
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

    /// Set the line-item cap for both paths.
    pub fn with_max_line_items(mut self, max_items: usize) -> Self {
        self.max_line_items = max_items;
        self.fallback = RuleBasedCategorizer::new().with_max_line_items(max_items);
        self
    }

    /// Whether a remote call will be attempted.
    pub fn has_remote(&self) -> bool {
        self.backend.is_some() && self.rules.accepts_opt(self.credential.as_deref())
    }

    /// Categorize a receipt. Never fails.
    pub async fn categorize(&self, receipt: &NormalizedReceipt) -> Categorization {
        let start = Instant::now();

        let (fields, source) = match self.categorize_remote(receipt).await {
            Ok(fields) => (fields, ExtractionSource::Remote),
            Err(e) => {
                warn!(error = %e, "Remote categorization unavailable, using keyword rules");
                (self.fallback.categorize(receipt), ExtractionSource::Fallback)
            }
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Categorized as {} ({:?}, confidence {:.2}) in {}ms",
            fields.category, source, fields.confidence, processing_time_ms
        );

        Categorization {
            fields,
            source,
            processing_time_ms,
        }
    }

    async fn categorize_remote(
        &self,
        receipt: &NormalizedReceipt,
    ) -> Result<ExpenseFields, CategorizationError> {
        if !self.rules.accepts_opt(self.credential.as_deref()) {
            return Err(CategorizationError::Credential);
        }
        let backend = self.backend.as_ref().ok_or(CategorizationError::NoBackend)?;

        let prompt = build_prompt(receipt);
        debug!(backend = backend.name(), prompt_len = prompt.len(), "Calling remote categorizer");

        let answer = tokio::time::timeout(self.timeout, backend.complete(&prompt))
            .await
            .map_err(|_| CategorizationError::Timeout(self.timeout.as_secs()))??;

        parse_response(&answer, self.max_line_items)
    }
}

impl Default for HybridCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmountMode, CategoryLabel};
    use crate::receipt::Normalizer;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rcpt_inference::InferenceError;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubCompletion {
        answer: Option<String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubCompletion {
        fn new(answer: Option<&str>) -> Arc<Self> {
            Self::delayed(answer, Duration::ZERO)
        }

        fn delayed(answer: Option<&str>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.map(str::to_string),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for StubCompletion {
        async fn complete(&self, prompt: &str) -> rcpt_inference::Result<String> {
            assert!(prompt.contains("Receipt Text:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone().ok_or(InferenceError::Api {
                status: 500,
                message: "internal error".into(),
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn shell_receipt() -> NormalizedReceipt {
        Normalizer::new(AmountMode::Strict)
            .normalize("SHELL GAS STATION\nGASOLINE 12.5 GAL @ $3.89\nTOTAL $48.63")
    }

    fn categorizer(backend: Arc<StubCompletion>) -> HybridCategorizer {
        HybridCategorizer::new()
            .with_backend(backend)
            .with_credential(Some("sk-test-0123456789abcdef".into()))
            .with_credential_rules(CredentialRules::openai())
    }

    #[tokio::test]
    async fn test_remote_answer_is_used() {
        let backend = StubCompletion::new(Some(
            r#"{"merchant_name": "Shell", "total_amount": 48.63, "date": null,
                "category": "Transportation", "confidence": 0.88,
                "line_items": ["Gasoline"], "reasoning": "Fuel purchase"}"#,
        ));
        let result = categorizer(backend.clone()).categorize(&shell_receipt()).await;

        assert_eq!(result.source, ExtractionSource::Remote);
        assert_eq!(result.fields.merchant_name, "Shell");
        assert_eq!(result.fields.category, CategoryLabel::Transportation);
        assert_eq!(result.fields.confidence, 0.88);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_error_uses_rules() {
        let backend = StubCompletion::new(None);
        let result = categorizer(backend.clone()).categorize(&shell_receipt()).await;

        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.category, CategoryLabel::Transportation);
        assert!(result.fields.reasoning.contains("shell"));
        assert_eq!(result.fields.total_amount, Decimal::new(4863, 2));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_service_times_out_to_rules() {
        let backend = StubCompletion::delayed(
            Some(r#"{"merchant_name": "Shell", "total_amount": 48.63, "category": "Shopping"}"#),
            Duration::from_secs(60),
        );
        let result = categorizer(backend.clone())
            .with_timeout(Duration::from_secs(5))
            .categorize(&shell_receipt())
            .await;

        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.category, CategoryLabel::Transportation);
        assert_eq!(result.fields.total_amount, Decimal::new(4863, 2));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_answer_uses_rules() {
        let backend = StubCompletion::new(Some("Sorry, I can't help with that."));
        let result = categorizer(backend).categorize(&shell_receipt()).await;
        assert_eq!(result.source, ExtractionSource::Fallback);
    }

    #[tokio::test]
    async fn test_negative_total_uses_rules() {
        let backend = StubCompletion::new(Some(r#"{"total_amount": -48.63, "category": "Transportation"}"#));
        let result = categorizer(backend).categorize(&shell_receipt()).await;

        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.total_amount, Decimal::new(4863, 2));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_remote() {
        let backend = StubCompletion::new(Some("{}"));
        let categorizer = HybridCategorizer::new()
            .with_backend(backend.clone())
            .with_credential_rules(CredentialRules::openai());

        assert!(!categorizer.has_remote());
        let result = categorizer.categorize(&shell_receipt()).await;

        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rules_only() {
        let result = HybridCategorizer::default()
            .categorize(&NormalizedReceipt::default())
            .await;

        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.category, CategoryLabel::Other);
        assert_eq!(result.fields.confidence, 0.4);
    }
}
