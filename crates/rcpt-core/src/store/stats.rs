//! Aggregates over stored expenses.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CategoryLabel, ExpenseRecord, ProcessedBy};

/// Lower bound of the high-confidence band.
pub const HIGH_CONFIDENCE: f32 = 0.8;

/// Lower bound of the medium-confidence band.
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// Coarse confidence rating shown next to pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceBand::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

/// Share of pipeline records categorized with high confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    /// Number of `ocr_llm` records.
    pub total: usize,
    /// Records with confidence >= 0.8.
    pub high_confidence: usize,
    /// `high_confidence / total`, or 0 for an empty store.
    pub accuracy: f64,
}

impl AccuracyStats {
    pub fn from_records(records: &[ExpenseRecord]) -> Self {
        let pipeline: Vec<&ExpenseRecord> = records
            .iter()
            .filter(|r| r.processed_by == ProcessedBy::OcrLlm)
            .collect();

        let total = pipeline.len();
        let high_confidence = pipeline
            .iter()
            .filter(|r| r.confidence.is_some_and(|c| c >= HIGH_CONFIDENCE))
            .count();
        let accuracy = if total > 0 {
            high_confidence as f64 / total as f64
        } else {
            0.0
        };

        Self {
            total,
            high_confidence,
            accuracy,
        }
    }
}

/// Headline numbers for the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub expense_count: usize,
    pub ocr_count: usize,
    pub total_amount: Decimal,
}

impl StoreSummary {
    pub fn from_records(records: &[ExpenseRecord]) -> Self {
        Self {
            expense_count: records.len(),
            ocr_count: records
                .iter()
                .filter(|r| r.processed_by == ProcessedBy::OcrLlm)
                .count(),
            total_amount: super::total_amount(records),
        }
    }
}

/// Spending per month (`YYYY-MM`) and category, newest month first.
pub fn monthly_breakdown(
    records: &[ExpenseRecord],
) -> Vec<(String, BTreeMap<CategoryLabel, Decimal>)> {
    let mut months: BTreeMap<String, BTreeMap<CategoryLabel, Decimal>> = BTreeMap::new();

    for record in records {
        let month = record.effective_date().format("%Y-%m").to_string();
        let spent = months
            .entry(month)
            .or_default()
            .entry(record.category)
            .or_default();
        *spent = spent.saturating_add(record.total_amount);
    }

    months.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(
        processed_by: ProcessedBy,
        confidence: Option<f32>,
        amount: i64,
        category: CategoryLabel,
        date: Option<NaiveDate>,
    ) -> ExpenseRecord {
        ExpenseRecord {
            id: "x".into(),
            merchant_name: "M".into(),
            total_amount: Decimal::new(amount, 2),
            date,
            category,
            confidence,
            line_items: vec![],
            reasoning: None,
            full_text: None,
            image_uri: None,
            subtotal_amount: None,
            gst_amount: None,
            created_at: Utc.with_ymd_and_hms(2024, 9, 3, 12, 0, 0).unwrap(),
            processed_by,
        }
    }

    #[test]
    fn test_confidence_band() {
        assert_eq!(ConfidenceBand::from_confidence(0.95), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.8), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.6), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(0.4), ConfidenceBand::Low);
    }

    #[test]
    fn test_accuracy_only_counts_pipeline_records() {
        let records = vec![
            record(ProcessedBy::OcrLlm, Some(0.92), 940, CategoryLabel::FoodAndDining, None),
            record(ProcessedBy::OcrLlm, Some(0.4), 100, CategoryLabel::Other, None),
            record(ProcessedBy::ManualEntry, None, 500, CategoryLabel::Home, None),
        ];
        let stats = AccuracyStats::from_records(&records);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.high_confidence, 1);
        assert_eq!(stats.accuracy, 0.5);
        assert_eq!(AccuracyStats::from_records(&[]), AccuracyStats::default());
    }

    #[test]
    fn test_summary() {
        let records = vec![
            record(ProcessedBy::OcrLlm, Some(0.9), 940, CategoryLabel::FoodAndDining, None),
            record(ProcessedBy::ManualEntry, None, 4863, CategoryLabel::Transportation, None),
        ];
        let summary = StoreSummary::from_records(&records);

        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.ocr_count, 1);
        assert_eq!(summary.total_amount, Decimal::new(5803, 2));
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let mut big = record(ProcessedBy::ManualEntry, None, 0, CategoryLabel::Home, None);
        big.total_amount = Decimal::MAX;
        let records = vec![big.clone(), big];

        assert_eq!(StoreSummary::from_records(&records).total_amount, Decimal::MAX);
        assert_eq!(
            monthly_breakdown(&records)[0].1.get(&CategoryLabel::Home),
            Some(&Decimal::MAX)
        );
    }

    #[test]
    fn test_monthly_breakdown() {
        let aug = NaiveDate::from_ymd_opt(2024, 8, 27);
        let records = vec![
            record(ProcessedBy::OcrLlm, Some(0.9), 940, CategoryLabel::FoodAndDining, aug),
            record(ProcessedBy::OcrLlm, Some(0.9), 500, CategoryLabel::FoodAndDining, aug),
            record(ProcessedBy::ManualEntry, None, 4863, CategoryLabel::Transportation, None),
        ];
        let breakdown = monthly_breakdown(&records);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].0, "2024-09");
        assert_eq!(
            breakdown[0].1.get(&CategoryLabel::Transportation),
            Some(&Decimal::new(4863, 2))
        );
        assert_eq!(breakdown[1].0, "2024-08");
        assert_eq!(
            breakdown[1].1.get(&CategoryLabel::FoodAndDining),
            Some(&Decimal::new(1440, 2))
        );
    }
}
