//! Line-item extraction for receipt text.

use super::patterns::{LINE_ITEM, SUMMARY_ROW};
use super::{ExtractionMatch, FieldExtractor};

/// Default cap on extracted line items.
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Line-item extractor.
///
/// Takes the first `NAME $PRICE` candidate of each line, skipping summary
/// rows (`TOTAL`, `TAX`, `SUBTOTAL`).
pub struct LineItemExtractor {
    max_items: usize,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Set the maximum number of items returned by `extract_all`.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Extract items from already split lines.
    pub fn extract_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| self.extract(line.as_ref()))
            .map(|m| m.value)
            .take(self.max_items)
            .collect()
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let m = LINE_ITEM.find(text)?;
        let item = m.as_str().trim();
        if item.is_empty() || SUMMARY_ROW.is_match(item) {
            return None;
        }
        Some(ExtractionMatch::new(item.to_string(), m.as_str()).with_position(m.start(), m.end()))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        text.lines()
            .filter_map(|line| self.extract(line))
            .take(self.max_items)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_items() {
        let lines = [
            "GRANDE LATTE     $5.45",
            "CHOCOLATE CROISSANT $3.25",
            "SUBTOTAL         $8.70",
            "TAX              $0.70",
            "TOTAL            $9.40",
            "THANK YOU",
        ];
        let items = LineItemExtractor::new().extract_from_lines(&lines);

        assert_eq!(items, vec!["GRANDE LATTE     $5.45", "CHOCOLATE CROISSANT $3.25"]);
    }

    #[test]
    fn test_lowercase_or_short_names_are_ignored() {
        let extractor = LineItemExtractor::new();
        assert!(extractor.extract("grande latte $5.45").is_none());
        assert!(extractor.extract("AB $1.00").is_none());
    }

    #[test]
    fn test_cap() {
        let text = (0..15).map(|_| "WIDGET ITEM $1.00").collect::<Vec<_>>().join("\n");
        assert_eq!(LineItemExtractor::new().extract_all(&text).len(), 10);
        assert_eq!(
            LineItemExtractor::new().with_max_items(3).extract_all(&text).len(),
            3
        );
    }
}
