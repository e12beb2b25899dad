//! WASM bindings for receipt processing.
//!
//! Exposes the local parts of the pipeline (normalization, rule-based
//! categorization, manual entry) and an in-memory expense book to browsers
//! and Node.js. Remote OCR and completion calls stay on the host side.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use js_sys::{Array, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use rcpt_core::models::{AmountMode, CategoryLabel, ExpenseRecord};
use rcpt_core::store::{AccuracyStats, ExpenseQuery, SortKey, SortOrder, StoreSummary};
use rcpt_core::{ExpenseStore, ManualEntry, Normalizer, RuleBasedCategorizer};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn amount_mode(strict: bool) -> AmountMode {
    if strict {
        AmountMode::Strict
    } else {
        AmountMode::Lenient
    }
}

/// Current time from the JS clock.
fn js_now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// The fixed category labels, in display order.
#[wasm_bindgen]
pub fn category_labels() -> Array {
    CategoryLabel::ALL
        .iter()
        .map(|label| JsValue::from_str(label.as_str()))
        .collect()
}

/// Normalize raw OCR text.
///
/// Returns `{ full_text, amounts, merchant_info, lines }`.
#[wasm_bindgen]
pub fn normalize_receipt_text(text: &str, strict_amounts: bool) -> Result<JsValue, JsValue> {
    to_js(&Normalizer::new(amount_mode(strict_amounts)).normalize(text))
}

/// Normalize and categorize OCR text with the local keyword rules.
#[wasm_bindgen]
pub fn categorize_receipt_text(text: &str, strict_amounts: bool) -> Result<JsValue, JsValue> {
    let receipt = Normalizer::new(amount_mode(strict_amounts)).normalize(text);
    to_js(&RuleBasedCategorizer::new().categorize(&receipt))
}

/// Validate a manual entry and build the record that would be stored.
///
/// `entry` is `{ merchant, category, date?, line_items: [{ name, price }], gst_amount? }`
/// with prices as decimal strings.
#[wasm_bindgen]
pub fn build_manual_expense(entry: JsValue) -> Result<JsValue, JsValue> {
    let entry: ManualEntry = serde_wasm_bindgen::from_value(entry).map_err(js_error)?;
    let record = entry
        .into_record(uuid::Uuid::new_v4().to_string(), js_now())
        .map_err(js_error)?;
    to_js(&record)
}

/// In-memory expense collection for browser sessions.
#[wasm_bindgen]
pub struct ExpenseBook {
    store: Arc<ExpenseStore>,
}

#[wasm_bindgen]
impl ExpenseBook {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: Arc::new(ExpenseStore::in_memory()),
        }
    }

    /// Load a previously exported JSON array of records.
    #[wasm_bindgen]
    pub fn import_json(&self, json: String) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            let mut records: Vec<ExpenseRecord> = serde_json::from_str(&json).map_err(js_error)?;
            // Stored newest first; appending oldest first keeps that order.
            records.reverse();
            let count = records.len();
            for record in records {
                store.append(record).await.map_err(js_error)?;
            }
            Ok(JsValue::from(count as u32))
        })
    }

    /// Validate and store a manual entry; resolves to the stored record.
    #[wasm_bindgen]
    pub fn add_manual(&self, entry: JsValue) -> Promise {
        let store = Arc::clone(&self.store);
        let entry: Result<ManualEntry, _> = serde_wasm_bindgen::from_value(entry);
        future_to_promise(async move {
            let entry = entry.map_err(js_error)?;
            let record = entry
                .into_record(uuid::Uuid::new_v4().to_string(), js_now())
                .map_err(js_error)?;
            let stored = store.append(record).await.map_err(js_error)?;
            to_js(&stored)
        })
    }

    /// Filtered, sorted records.
    ///
    /// `sort_by` is one of `date`, `amount`, `merchant`, `category`.
    #[wasm_bindgen]
    pub fn list(
        &self,
        category: Option<String>,
        search: Option<String>,
        sort_by: Option<String>,
        ascending: bool,
    ) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            let key = match sort_by {
                Some(s) => s.parse::<SortKey>().map_err(js_error)?,
                None => SortKey::default(),
            };
            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };

            let mut query = ExpenseQuery::new().sorted_by(key, order);
            if let Some(category) = category {
                let label = CategoryLabel::resolve(&category)
                    .ok_or_else(|| js_error(format!("unknown category: {}", category)))?;
                query = query.with_category(label);
            }
            if let Some(search) = search {
                query = query.with_search(search);
            }

            to_js(&store.query(&query).await.map_err(js_error)?)
        })
    }

    /// Delete one record; resolves to whether it existed.
    #[wasm_bindgen]
    pub fn remove(&self, id: String) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            let removed = store.remove(&id).await.map_err(js_error)?;
            Ok(JsValue::from_bool(removed))
        })
    }

    /// Insert the sample records if the book is empty.
    #[wasm_bindgen]
    pub fn seed_samples(&self) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            let added = store.seed_samples().await.map_err(js_error)?;
            Ok(JsValue::from(added as u32))
        })
    }

    /// `{ summary, accuracy }` for the whole book.
    #[wasm_bindgen]
    pub fn stats(&self) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            #[derive(serde::Serialize)]
            struct Stats {
                summary: StoreSummary,
                accuracy: AccuracyStats,
            }

            let records = store.list().await.map_err(js_error)?;
            to_js(&Stats {
                summary: StoreSummary::from_records(&records),
                accuracy: AccuracyStats::from_records(&records),
            })
        })
    }

    /// All records as a JSON array, newest first.
    #[wasm_bindgen]
    pub fn export_json(&self) -> Promise {
        let store = Arc::clone(&self.store);
        future_to_promise(async move {
            let records = store.list().await.map_err(js_error)?;
            let json = serde_json::to_string(&records).map_err(js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

impl Default for ExpenseBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcpt_core::models::{ExpenseFields, NormalizedReceipt};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const STARBUCKS: &str =
        "STARBUCKS STORE #1234\nGRANDE LATTE $5.45\nCHOCOLATE CROISSANT $3.25\nTOTAL $9.40";

    #[wasm_bindgen_test]
    fn test_category_labels() {
        let labels = category_labels();
        assert_eq!(labels.length(), 13);
        assert_eq!(labels.get(0).as_string().as_deref(), Some("Food & Dining"));
    }

    #[wasm_bindgen_test]
    fn test_normalize_receipt_text() {
        let value = normalize_receipt_text(STARBUCKS, true).unwrap();
        let receipt: NormalizedReceipt = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(receipt.lines.len(), 4);
        assert_eq!(receipt.merchant_info, "STARBUCKS STORE 1234 GRANDE LATTE $5.45 CHOCOLATE CROISSANT $3.25");
    }

    #[wasm_bindgen_test]
    fn test_categorize_receipt_text() {
        let value = categorize_receipt_text(STARBUCKS, true).unwrap();
        let fields: ExpenseFields = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(fields.category, CategoryLabel::FoodAndDining);
        assert_eq!(fields.total_amount.to_string(), "9.40");
    }

    #[wasm_bindgen_test]
    fn test_build_manual_expense_rejects_blank_merchant() {
        let entry = serde_wasm_bindgen::to_value(&ManualEntry {
            merchant: String::new(),
            category: "Shopping".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(build_manual_expense(entry).is_err());
    }
}
