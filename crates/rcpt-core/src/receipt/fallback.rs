//! Deterministic rule-based categorization.

use tracing::debug;

use super::rules::{DateExtractor, FieldExtractor, LineItemExtractor, match_category};
use crate::models::{ExpenseFields, NormalizedReceipt};

/// Reasoning used when no keyword matched.
pub const NO_KEYWORDS_REASONING: &str = "No specific category keywords found";

/// Keyword-table categorizer used when the remote service is unavailable.
///
/// Pure: the same receipt always yields the same fields.
pub struct RuleBasedCategorizer {
    line_items: LineItemExtractor,
    dates: DateExtractor,
}

impl RuleBasedCategorizer {
    pub fn new() -> Self {
        Self {
            line_items: LineItemExtractor::new(),
            dates: DateExtractor::new(),
        }
    }

    /// Set the line-item cap.
    pub fn with_max_line_items(mut self, max_items: usize) -> Self {
        self.line_items = self.line_items.with_max_items(max_items);
        self
    }

    pub fn categorize(&self, receipt: &NormalizedReceipt) -> ExpenseFields {
        let text = receipt.full_text.to_lowercase();
        let merchant = receipt.merchant_info.to_lowercase();

        let keyword_match = match_category(&[&text, &merchant]);
        let line_items = self.line_items.extract_from_lines(&receipt.lines);
        let date = self.dates.extract(&receipt.full_text).map(|m| m.value);

        // Tenths keep the sums exact: 0.4 base, +0.3 keywords, +0.2 items, +0.1 date.
        let mut tenths = 4u8;
        if !keyword_match.is_empty() {
            tenths += 3;
        }
        if !line_items.is_empty() {
            tenths += 2;
        }
        if date.is_some() {
            tenths += 1;
        }
        let confidence = (f32::from(tenths) / 10.0).min(0.95);

        let reasoning = if keyword_match.is_empty() {
            NO_KEYWORDS_REASONING.to_string()
        } else {
            format!("Matched keywords: {}", keyword_match.keywords.join(", "))
        };

        debug!(
            category = %keyword_match.category,
            confidence,
            items = line_items.len(),
            "Rule-based categorization"
        );

        ExpenseFields {
            merchant_name: receipt.merchant_info.clone(),
            total_amount: receipt.max_amount(),
            date,
            category: keyword_match.category,
            confidence,
            line_items,
            reasoning,
        }
    }
}

impl Default for RuleBasedCategorizer {
    fn default() -> Self {
        Self::new()
    }
}
