//! Filtering, searching and sorting stored expenses.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CategoryLabel, ExpenseRecord};

/// Field to sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Creation time.
    #[default]
    Date,
    Amount,
    Merchant,
    Category,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "amount" => Ok(SortKey::Amount),
            "merchant" => Ok(SortKey::Merchant),
            "category" => Ok(SortKey::Category),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    /// Newest, largest or last-in-alphabet first.
    #[default]
    Descending,
}

/// A filter-and-sort request over the expense list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseQuery {
    /// Only this category.
    pub category: Option<CategoryLabel>,
    /// Case-insensitive text matched against merchant, category, items and amount.
    pub search: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl ExpenseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryLabel) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.order = order;
        self
    }

    /// Whether a single record passes the filters.
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if self.category.is_some_and(|c| c != record.category) {
            return false;
        }

        let Some(needle) = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
        else {
            return true;
        };

        record.merchant_name.to_lowercase().contains(&needle)
            || record.category.as_str().to_lowercase().contains(&needle)
            || record
                .line_items
                .iter()
                .any(|item| item.to_lowercase().contains(&needle))
            || format!("{:.2}", record.total_amount).contains(&needle)
    }

    /// Filter and sort a list of records.
    pub fn apply(&self, records: &[ExpenseRecord]) -> Vec<ExpenseRecord> {
        let mut result: Vec<ExpenseRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();

        // Stable sort keeps store order (newest first) among equal keys.
        result.sort_by(|a, b| {
            let ordering = compare(self.sort_by, a, b);
            match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        result
    }
}

fn compare(key: SortKey, a: &ExpenseRecord, b: &ExpenseRecord) -> Ordering {
    match key {
        SortKey::Date => a.created_at.cmp(&b.created_at),
        SortKey::Amount => a.total_amount.cmp(&b.total_amount),
        SortKey::Merchant => a
            .merchant_name
            .to_lowercase()
            .cmp(&b.merchant_name.to_lowercase()),
        SortKey::Category => a.category.as_str().cmp(b.category.as_str()),
    }
}

/// Sum of amounts, saturating at the decimal range.
pub fn total_amount(records: &[ExpenseRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.total_amount))
}

/// Mean amount rounded to cents, or zero for an empty list.
pub fn average_amount(records: &[ExpenseRecord]) -> Decimal {
    if records.is_empty() {
        return Decimal::ZERO;
    }
    (total_amount(records) / Decimal::from(records.len())).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessedBy;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, merchant: &str, cents: i64, category: CategoryLabel, age_days: i64) -> ExpenseRecord {
        ExpenseRecord {
            id: id.into(),
            merchant_name: merchant.into(),
            total_amount: Decimal::new(cents, 2),
            date: None,
            category,
            confidence: None,
            line_items: vec![format!("{} item", merchant)],
            reasoning: None,
            full_text: None,
            image_uri: None,
            subtotal_amount: None,
            gst_amount: None,
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap() - Duration::days(age_days),
            processed_by: ProcessedBy::ManualEntry,
        }
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            record("1", "Starbucks", 940, CategoryLabel::FoodAndDining, 0),
            record("2", "Shell", 4863, CategoryLabel::Transportation, 1),
            record("3", "Target", 2599, CategoryLabel::Shopping, 2),
        ]
    }

    fn ids(records: &[ExpenseRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let result = ExpenseQuery::new().apply(&sample());
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_by_amount_and_merchant() {
        let by_amount = ExpenseQuery::new()
            .sorted_by(SortKey::Amount, SortOrder::Descending)
            .apply(&sample());
        assert_eq!(ids(&by_amount), vec!["2", "3", "1"]);

        let by_merchant = ExpenseQuery::new()
            .sorted_by(SortKey::Merchant, SortOrder::Ascending)
            .apply(&sample());
        assert_eq!(ids(&by_merchant), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filter_and_search() {
        let food = ExpenseQuery::new()
            .with_category(CategoryLabel::FoodAndDining)
            .apply(&sample());
        assert_eq!(ids(&food), vec!["1"]);

        let by_text = ExpenseQuery::new().with_search("TRANSPORT").apply(&sample());
        assert_eq!(ids(&by_text), vec!["2"]);

        let by_item = ExpenseQuery::new().with_search("target item").apply(&sample());
        assert_eq!(ids(&by_item), vec!["3"]);

        let by_amount = ExpenseQuery::new().with_search("48.63").apply(&sample());
        assert_eq!(ids(&by_amount), vec!["2"]);

        let blank = ExpenseQuery::new().with_search("  ").apply(&sample());
        assert_eq!(blank.len(), 3);
    }

    #[test]
    fn test_totals() {
        let records = sample();
        assert_eq!(total_amount(&records), Decimal::new(8402, 2));
        assert_eq!(average_amount(&records), Decimal::new(2801, 2));
        assert_eq!(average_amount(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_totals_saturate() {
        let mut records = sample();
        records[0].total_amount = Decimal::MAX;

        assert_eq!(total_amount(&records), Decimal::MAX);
        assert!(average_amount(&records) > Decimal::ZERO);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("Amount".parse::<SortKey>(), Ok(SortKey::Amount));
        assert!("size".parse::<SortKey>().is_err());
    }
}
