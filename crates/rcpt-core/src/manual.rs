//! Manual expense entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::models::{CategoryLabel, ExpenseRecord, ProcessedBy};
use crate::store::ExpenseStore;

/// One purchased item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub name: String,
    pub price: Decimal,
}

impl LineItemInput {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// User-supplied expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub merchant: String,
    /// Category label or an unambiguous prefix of one (`"food"`).
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
    #[serde(default)]
    pub gst_amount: Option<Decimal>,
}

impl ManualEntry {
    /// Check the entry and resolve its category.
    pub fn validate(&self) -> std::result::Result<CategoryLabel, ValidationError> {
        if self.merchant.trim().is_empty() {
            return Err(ValidationError::MissingField("merchant"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        if self.line_items.is_empty() {
            return Err(ValidationError::NoLineItems);
        }

        for (i, item) in self.line_items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(ValidationError::BlankItemName(i + 1));
            }
            if item.price < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: format!("price of {}", item.name.trim()),
                    value: item.price.to_string(),
                });
            }
        }

        if let Some(gst) = self.gst_amount.filter(|g| *g < Decimal::ZERO) {
            return Err(ValidationError::NegativeAmount {
                field: "gst_amount".to_string(),
                value: gst.to_string(),
            });
        }

        self.total()?;

        CategoryLabel::resolve(&self.category)
            .ok_or_else(|| ValidationError::UnknownCategory(self.category.trim().to_string()))
    }

    /// Sum of item prices.
    pub fn subtotal(&self) -> std::result::Result<Decimal, ValidationError> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.price))
            .ok_or(ValidationError::AmountOverflow("subtotal"))
    }

    /// Subtotal plus GST.
    pub fn total(&self) -> std::result::Result<Decimal, ValidationError> {
        self.subtotal()?
            .checked_add(self.gst_amount.unwrap_or(Decimal::ZERO))
            .ok_or(ValidationError::AmountOverflow("total"))
    }

    /// Validate and build the record to persist.
    pub fn into_record(
        self,
        id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> std::result::Result<ExpenseRecord, ValidationError> {
        let category = self.validate()?;
        let subtotal = self.subtotal()?;
        let total = self.total()?;

        Ok(ExpenseRecord {
            id: id.into(),
            merchant_name: self.merchant.trim().to_string(),
            total_amount: total,
            date: Some(self.date.unwrap_or_else(|| now.date_naive())),
            category,
            confidence: None,
            line_items: self
                .line_items
                .into_iter()
                .map(|i| i.name.trim().to_string())
                .collect(),
            reasoning: None,
            full_text: None,
            image_uri: None,
            subtotal_amount: Some(subtotal),
            gst_amount: self.gst_amount,
            created_at: now,
            processed_by: ProcessedBy::ManualEntry,
        })
    }
}

/// Validate a manual entry and prepend it to the store.
///
/// Nothing is written when validation fails.
pub async fn record_manual_entry(store: &ExpenseStore, entry: ManualEntry) -> Result<ExpenseRecord> {
    let record = entry.into_record(Uuid::new_v4().to_string(), Utc::now())?;
    let stored = store.append(record).await?;
    info!("Recorded manual expense {} ({})", stored.id, stored.total_amount);
    Ok(stored)
}
