//! Raw OCR text to `NormalizedReceipt`.

use tracing::debug;

use super::rules::{AmountExtractor, FieldExtractor};
use crate::models::{AmountMode, NormalizedReceipt};

/// Punctuation kept by the cleaning step.
const KEPT_PUNCTUATION: &[char] = &['$', '.', ',', '(', ')', '-'];

/// Number of leading lines that make up the merchant block.
const MERCHANT_LINES: usize = 3;

/// Text normalizer.
pub struct Normalizer {
    amounts: AmountExtractor,
}

impl Normalizer {
    pub fn new(mode: AmountMode) -> Self {
        Self {
            amounts: AmountExtractor::new(mode),
        }
    }

    /// Normalize raw text. Never fails; empty input yields an empty receipt.
    pub fn normalize(&self, raw: &str) -> NormalizedReceipt {
        let full_text = clean_text(raw);

        let amounts = self
            .amounts
            .extract_all(&full_text)
            .into_iter()
            .map(|m| m.value)
            .collect::<Vec<_>>();

        let lines: Vec<String> = full_text
            .split('\n')
            .map(str::trim)
            .filter(|l| l.chars().count() > 2)
            .map(str::to_string)
            .collect();

        let merchant_info = lines
            .iter()
            .take(MERCHANT_LINES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        debug!(
            amounts = amounts.len(),
            lines = lines.len(),
            mode = ?self.amounts.mode(),
            "Normalized receipt text"
        );

        NormalizedReceipt {
            full_text,
            amounts,
            merchant_info,
            lines,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(AmountMode::default())
    }
}

/// Drop everything but alphanumerics, whitespace and `$ . , ( ) -`, then trim.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const STARBUCKS: &str =
        "STARBUCKS STORE #1234\nGRANDE LATTE $5.45\nCHOCOLATE CROISSANT $3.25\nTOTAL $9.40";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_lenient_amounts_include_store_number() {
        let receipt = Normalizer::new(AmountMode::Lenient).normalize(STARBUCKS);

        assert_eq!(
            receipt.amounts,
            vec![dec("1234"), dec("5.45"), dec("3.25"), dec("9.40")]
        );
        assert_eq!(receipt.max_amount(), dec("1234"));
    }

    #[test]
    fn test_strict_amounts_exclude_store_number() {
        let receipt = Normalizer::new(AmountMode::Strict).normalize(STARBUCKS);

        assert_eq!(receipt.amounts, vec![dec("5.45"), dec("3.25"), dec("9.40")]);
        assert_eq!(receipt.max_amount(), dec("9.40"));
    }

    #[test]
    fn test_lines_and_merchant_info() {
        let receipt = Normalizer::default().normalize(STARBUCKS);

        assert_eq!(receipt.full_text.lines().next(), Some("STARBUCKS STORE 1234"));
        assert_eq!(receipt.lines.len(), 4);
        assert_eq!(
            receipt.merchant_info,
            "STARBUCKS STORE 1234 GRANDE LATTE $5.45 CHOCOLATE CROISSANT $3.25"
        );
    }

    #[test]
    fn test_short_and_blank_lines_dropped() {
        let receipt = Normalizer::default().normalize("  SHOP  \n\nok\n  ab \nTOTAL $1.00\n");

        assert_eq!(receipt.lines, vec!["SHOP", "TOTAL $1.00"]);
        assert_eq!(receipt.merchant_info, "SHOP TOTAL $1.00");
    }

    #[test]
    fn test_empty_input() {
        let receipt = Normalizer::default().normalize("   \n  ");
        assert_eq!(receipt, NormalizedReceipt::default());
    }

    #[test]
    fn test_cleaning_strips_symbols() {
        assert_eq!(clean_text("  12.5 GAL @ $3.89 *** (x) a-b!  "), "12.5 GAL  $3.89  (x) a-b");
    }

    #[test]
    fn test_renormalizing_is_stable() {
        for mode in [AmountMode::Lenient, AmountMode::Strict] {
            let normalizer = Normalizer::new(mode);
            let first = normalizer.normalize("SHELL #42 @ 12.5 GAL $3.89\nTOTAL: $48.63 12/01/2024");
            let second = normalizer.normalize(&first.full_text);
            assert_eq!(first.amounts, second.amounts);
            assert_eq!(first, second);
        }
    }
}
