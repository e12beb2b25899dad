//! Expense data models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of expense categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryLabel {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    #[serde(rename = "Home")]
    Home,
    #[serde(rename = "Insurance")]
    Insurance,
    /// Fallback when nothing matches.
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl CategoryLabel {
    /// All labels in display order.
    pub const ALL: [CategoryLabel; 13] = [
        CategoryLabel::FoodAndDining,
        CategoryLabel::Transportation,
        CategoryLabel::Shopping,
        CategoryLabel::Entertainment,
        CategoryLabel::BillsAndUtilities,
        CategoryLabel::Healthcare,
        CategoryLabel::Travel,
        CategoryLabel::Education,
        CategoryLabel::Business,
        CategoryLabel::PersonalCare,
        CategoryLabel::Home,
        CategoryLabel::Insurance,
        CategoryLabel::Other,
    ];

    /// Display label, as stored and as shown to the language model.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryLabel::FoodAndDining => "Food & Dining",
            CategoryLabel::Transportation => "Transportation",
            CategoryLabel::Shopping => "Shopping",
            CategoryLabel::Entertainment => "Entertainment",
            CategoryLabel::BillsAndUtilities => "Bills & Utilities",
            CategoryLabel::Healthcare => "Healthcare",
            CategoryLabel::Travel => "Travel",
            CategoryLabel::Education => "Education",
            CategoryLabel::Business => "Business",
            CategoryLabel::PersonalCare => "Personal Care",
            CategoryLabel::Home => "Home",
            CategoryLabel::Insurance => "Insurance",
            CategoryLabel::Other => "Other",
        }
    }

    /// Resolve free user input to a label.
    ///
    /// Accepts an exact label (any case) or a prefix that matches exactly one
    /// label, so `"food"` resolves to `Food & Dining`.
    pub fn resolve(input: &str) -> Option<Self> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Ok(label) = needle.parse() {
            return Some(label);
        }

        let mut matches = Self::ALL
            .iter()
            .filter(|l| l.as_str().to_lowercase().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(label), None) => Some(*label),
            _ => None,
        }
    }

    /// Labels joined for prompts: `"Food & Dining, Transportation, ..."`.
    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for CategoryLabel {
    type Err = String;

    /// Exact label match, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessedBy {
    /// Receipt pipeline (OCR + categorization).
    OcrLlm,
    /// User-entered expense.
    ManualEntry,
    /// Developer test record.
    ManualTest,
}

impl ProcessedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessedBy::OcrLlm => "ocr_llm",
            ProcessedBy::ManualEntry => "manual_entry",
            ProcessedBy::ManualTest => "manual_test",
        }
    }
}

impl fmt::Display for ProcessedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a stage used its remote service or its local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Remote,
    Fallback,
}

/// Fields produced by categorization, before a record is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFields {
    pub merchant_name: String,
    pub total_amount: Decimal,
    pub date: Option<NaiveDate>,
    pub category: CategoryLabel,
    pub confidence: f32,
    pub line_items: Vec<String>,
    pub reasoning: String,
}

/// A persisted expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier.
    pub id: String,

    /// Merchant name.
    pub merchant_name: String,

    /// Total amount, never negative.
    pub total_amount: Decimal,

    /// Date printed on the receipt or chosen by the user.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Expense category.
    #[serde(default)]
    pub category: CategoryLabel,

    /// Categorization confidence (0.0 - 1.0); only set for pipeline records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Item descriptions.
    #[serde(default)]
    pub line_items: Vec<String>,

    /// Why the category was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Raw OCR text kept for audit.
    #[serde(rename = "fullText", default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,

    /// Reference to the source image (never the bytes).
    #[serde(default)]
    pub image_uri: Option<String>,

    /// Sum of item prices (manual entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal_amount: Option<Decimal>,

    /// GST/tax amount (manual entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_amount: Option<Decimal>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Producing path.
    pub processed_by: ProcessedBy,
}

impl ExpenseRecord {
    /// Assemble a pipeline record from categorization output.
    pub fn from_fields(
        id: impl Into<String>,
        fields: ExpenseFields,
        full_text: impl Into<String>,
        image_uri: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            merchant_name: fields.merchant_name,
            total_amount: fields.total_amount.max(Decimal::ZERO),
            date: fields.date,
            category: fields.category,
            confidence: Some(fields.confidence.clamp(0.0, 1.0)),
            line_items: fields.line_items,
            reasoning: Some(fields.reasoning),
            full_text: Some(full_text.into()),
            image_uri,
            subtotal_amount: None,
            gst_amount: None,
            created_at,
            processed_by: ProcessedBy::OcrLlm,
        }
    }

    /// Date used for grouping: the receipt date, else the creation date.
    pub fn effective_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.created_at.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        for label in CategoryLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
            let back: CategoryLabel = serde_json::from_str(&json).unwrap();
            assert_eq!(back, label);
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Food & Dining".parse::<CategoryLabel>(), Ok(CategoryLabel::FoodAndDining));
        assert_eq!("bills & utilities".parse::<CategoryLabel>(), Ok(CategoryLabel::BillsAndUtilities));
        assert!("Groceries".parse::<CategoryLabel>().is_err());
    }

    #[test]
    fn test_category_resolve() {
        assert_eq!(CategoryLabel::resolve("food"), Some(CategoryLabel::FoodAndDining));
        assert_eq!(CategoryLabel::resolve("  Travel "), Some(CategoryLabel::Travel));
        assert_eq!(CategoryLabel::resolve("personal"), Some(CategoryLabel::PersonalCare));
        assert_eq!(CategoryLabel::resolve(""), None);
        assert_eq!(CategoryLabel::resolve("groceries"), None);
    }

    #[test]
    fn test_processed_by_wire_names() {
        assert_eq!(serde_json::to_string(&ProcessedBy::OcrLlm).unwrap(), "\"ocr_llm\"");
        assert_eq!(
            serde_json::to_string(&ProcessedBy::ManualEntry).unwrap(),
            "\"manual_entry\""
        );
        assert_eq!(
            serde_json::to_string(&ProcessedBy::ManualTest).unwrap(),
            "\"manual_test\""
        );
    }

    #[test]
    fn test_record_clamps_negative_total() {
        let fields = ExpenseFields {
            merchant_name: "X".into(),
            total_amount: Decimal::new(-5, 0),
            date: None,
            category: CategoryLabel::Other,
            confidence: 1.7,
            line_items: vec![],
            reasoning: String::new(),
        };
        let record = ExpenseRecord::from_fields("1", fields, "", None, Utc::now());

        assert_eq!(record.total_amount, Decimal::ZERO);
        assert_eq!(record.confidence, Some(1.0));
        assert_eq!(record.processed_by, ProcessedBy::OcrLlm);
    }

    #[test]
    fn test_record_json_uses_full_text_key() {
        let fields = ExpenseFields {
            merchant_name: "Shop".into(),
            total_amount: Decimal::new(940, 2),
            date: NaiveDate::from_ymd_opt(2024, 8, 27),
            category: CategoryLabel::Shopping,
            confidence: 0.9,
            line_items: vec!["A".into()],
            reasoning: "r".into(),
        };
        let record = ExpenseRecord::from_fields("1", fields, "SHOP", None, Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["fullText"], "SHOP");
        assert_eq!(json["date"], "2024-08-27");
        assert_eq!(json["category"], "Shopping");
        assert_eq!(json["processed_by"], "ocr_llm");
        assert!(json.get("gst_amount").is_none());
    }
}
