//! Amount extraction for receipt text.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_LENIENT, AMOUNT_STRICT};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::AmountMode;

/// Amount field extractor.
pub struct AmountExtractor {
    mode: AmountMode,
}

impl AmountExtractor {
    pub fn new(mode: AmountMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AmountMode {
        self.mode
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new(AmountMode::default())
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let pattern = match self.mode {
            AmountMode::Lenient => &*AMOUNT_LENIENT,
            AmountMode::Strict => &*AMOUNT_STRICT,
        };

        pattern
            .find_iter(text)
            .filter_map(|m| {
                parse_amount(m.as_str())
                    .map(|amount| ExtractionMatch::new(amount, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

/// Parse a currency-like token such as `"$5.45"`, `"1234"` or `"5."`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned = s.trim().trim_start_matches('$').trim_end_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}
