//! Receipt-to-expense pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rcpt_inference::{
    CloudVisionBackend, CompletionBackend, OpenAiBackend, OpenAiSettings, VisionBackend,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::credentials::key_from_env;
use crate::error::Result;
use crate::models::{ExpenseRecord, ExtractionSource, ImagePayload, OcrProvider, RcptConfig};
use crate::ocr::OcrEngine;
use crate::receipt::{HybridCategorizer, Normalizer};
use crate::store::ExpenseStore;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedReceipt {
    /// The record as stored.
    pub record: ExpenseRecord,
    /// Where the receipt text came from.
    pub text_source: ExtractionSource,
    /// Where the fields came from.
    pub fields_source: ExtractionSource,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extract, normalize, categorize and store, in that order.
///
/// Shared across tasks through `Arc`; runs are independent apart from the
/// store, which serializes its writes.
pub struct ReceiptPipeline {
    ocr: OcrEngine,
    normalizer: Normalizer,
    categorizer: HybridCategorizer,
    store: Arc<ExpenseStore>,
}

impl ReceiptPipeline {
    pub fn new(
        ocr: OcrEngine,
        normalizer: Normalizer,
        categorizer: HybridCategorizer,
        store: Arc<ExpenseStore>,
    ) -> Self {
        Self {
            ocr,
            normalizer,
            categorizer,
            store,
        }
    }

    /// Wire up the remote backends named by `config`, reading API keys from
    /// the environment. Stages without a usable key run on their fallbacks.
    pub fn from_config(config: &RcptConfig, store: Arc<ExpenseStore>) -> Self {
        Self::new(
            ocr_engine_from_config(config),
            Normalizer::new(config.extraction.amount_mode),
            categorizer_from_config(config),
            store,
        )
    }

    pub fn store(&self) -> &Arc<ExpenseStore> {
        &self.store
    }

    /// Whether each stage will attempt its remote service: `(ocr, categorization)`.
    pub fn remote_status(&self) -> (bool, bool) {
        (self.ocr.has_remote(), self.categorizer.has_remote())
    }

    /// Run the pipeline for one image.
    ///
    /// Only storage failures surface; remote failures fall back locally.
    pub async fn process(&self, image: &ImagePayload) -> Result<ProcessedReceipt> {
        let start = Instant::now();

        let extracted = self.ocr.extract_text(image).await;
        let receipt = self.normalizer.normalize(&extracted.text);
        let categorization = self.categorizer.categorize(&receipt).await;

        let record = ExpenseRecord::from_fields(
            Uuid::new_v4().to_string(),
            categorization.fields,
            extracted.text,
            image.uri.clone(),
            Utc::now(),
        );
        let record = self.store.append(record).await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Processed receipt {} -> {} {} in {}ms",
            record.id, record.category, record.total_amount, processing_time_ms
        );

        Ok(ProcessedReceipt {
            record,
            text_source: extracted.source,
            fields_source: categorization.source,
            processing_time_ms,
        })
    }
}

fn ocr_engine_from_config(config: &RcptConfig) -> OcrEngine {
    let ocr = &config.ocr;
    let timeout = Duration::from_secs(ocr.timeout_secs);
    let rules = ocr.credential_rules();
    let credential = key_from_env(&ocr.api_key_env);

    let mut builder = OcrEngine::builder()
        .with_credential(credential.clone())
        .with_credential_rules(rules.clone())
        .with_timeout(timeout);

    let Some(key) = credential.filter(|k| rules.accepts(k)) else {
        return builder.build();
    };

    let backend: Option<Arc<dyn VisionBackend>> = match ocr.provider {
        OcrProvider::OpenAi => {
            let mut settings = OpenAiSettings::new(key, &ocr.model)
                .with_temperature(Some(0.0))
                .with_max_tokens(Some(1000))
                .with_timeout(timeout);
            if let Some(url) = &ocr.base_url {
                settings = settings.with_base_url(url);
            }
            OpenAiBackend::new(settings)
                .map(|b| Arc::new(b) as Arc<dyn VisionBackend>)
                .map_err(|e| warn!("Failed to create OCR backend: {}", e))
                .ok()
        }
        OcrProvider::CloudVision => CloudVisionBackend::new(key, timeout)
            .map(|b| match &ocr.base_url {
                Some(url) => b.with_endpoint(url),
                None => b,
            })
            .map(|b| Arc::new(b) as Arc<dyn VisionBackend>)
            .map_err(|e| warn!("Failed to create OCR backend: {}", e))
            .ok(),
    };

    if let Some(backend) = backend {
        builder = builder.with_backend(backend);
    }
    builder.build()
}

fn categorizer_from_config(config: &RcptConfig) -> HybridCategorizer {
    let cat = &config.categorization;
    let timeout = Duration::from_secs(cat.timeout_secs);
    let rules = cat.credential_rules();
    let credential = key_from_env(&cat.api_key_env);

    let mut categorizer = HybridCategorizer::new()
        .with_credential(credential.clone())
        .with_credential_rules(rules.clone())
        .with_timeout(timeout)
        .with_max_line_items(config.extraction.max_line_items);

    let Some(key) = credential.filter(|k| rules.accepts(k)) else {
        return categorizer;
    };

    let mut settings = OpenAiSettings::new(key, &cat.model)
        .with_temperature(Some(cat.temperature))
        .with_max_tokens(Some(cat.max_tokens))
        .with_timeout(timeout);
    if let Some(url) = &cat.base_url {
        settings = settings.with_base_url(url);
    }

    match OpenAiBackend::new(settings) {
        Ok(backend) => {
            categorizer = categorizer.with_backend(Arc::new(backend) as Arc<dyn CompletionBackend>)
        }
        Err(e) => warn!("Failed to create categorization backend: {}", e),
    }
    categorizer
}
