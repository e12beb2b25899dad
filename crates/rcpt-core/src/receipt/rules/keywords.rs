//! Category keyword table and scoring.

use crate::models::CategoryLabel;

/// Category keyword table, in tie-break order.
///
/// Keywords are lower-case and matched as substrings.
pub const CATEGORY_KEYWORDS: &[(CategoryLabel, &[&str])] = &[
    (
        CategoryLabel::FoodAndDining,
        &[
            "restaurant", "cafe", "food", "pizza", "burger", "starbucks", "mcdonald", "grocery",
            "market",
        ],
    ),
    (
        CategoryLabel::Transportation,
        &[
            "uber", "taxi", "gas", "fuel", "parking", "metro", "bus", "shell", "exxon", "bp",
        ],
    ),
    (
        CategoryLabel::Shopping,
        &[
            "walmart", "wal-mart", "supercenter", "target", "amazon", "store", "retail", "mall",
            "shop",
        ],
    ),
    (
        CategoryLabel::BillsAndUtilities,
        &["electric", "water", "internet", "phone", "utility", "bill"],
    ),
    (
        CategoryLabel::Healthcare,
        &["pharmacy", "hospital", "doctor", "medical", "clinic", "cvs", "walgreens"],
    ),
    (
        CategoryLabel::Entertainment,
        &["movie", "theater", "game", "netflix", "spotify", "gym", "cinema"],
    ),
    (
        CategoryLabel::Travel,
        &["hotel", "airline", "airport", "flight", "motel", "airbnb"],
    ),
    (
        CategoryLabel::Education,
        &["school", "university", "college", "tuition", "bookstore", "course"],
    ),
    (
        CategoryLabel::Business,
        &["office", "staples", "fedex", "printing", "coworking"],
    ),
    (
        CategoryLabel::PersonalCare,
        &["salon", "barber", "cosmetics", "beauty"],
    ),
    (
        CategoryLabel::Home,
        &["hardware", "furniture", "home depot", "ikea", "lowes"],
    ),
    (
        CategoryLabel::Insurance,
        &["insurance", "geico", "allstate", "premium", "policy"],
    ),
];

/// Winning category and the keywords that put it there.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub category: CategoryLabel,
    pub keywords: Vec<&'static str>,
}

impl KeywordMatch {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Score every category against the given (lower-cased) fields.
///
/// The category with the most matching keywords wins; ties keep the earlier
/// row. With no match at all the result is `Other` with no keywords.
pub fn match_category(fields: &[&str]) -> KeywordMatch {
    let mut best = KeywordMatch {
        category: CategoryLabel::Other,
        keywords: Vec::new(),
    };

    for (category, keywords) in CATEGORY_KEYWORDS {
        let matched: Vec<&'static str> = keywords
            .iter()
            .copied()
            .filter(|k| fields.iter().any(|f| f.contains(k)))
            .collect();

        if matched.len() > best.keywords.len() {
            best = KeywordMatch {
                category: *category,
                keywords: matched,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_has_no_other_row() {
        assert!(CATEGORY_KEYWORDS.iter().all(|(c, _)| *c != CategoryLabel::Other));
        for (_, keywords) in CATEGORY_KEYWORDS {
            assert!(keywords.iter().all(|k| k.to_lowercase() == *k));
        }
    }

    #[test]
    fn test_tie_keeps_earlier_row() {
        // "starbucks" (Food & Dining) and "store" (Shopping) score one each.
        let result = match_category(&["starbucks store 1234", ""]);
        assert_eq!(result.category, CategoryLabel::FoodAndDining);
        assert_eq!(result.keywords, vec!["starbucks"]);
    }

    #[test]
    fn test_highest_count_wins() {
        let result = match_category(&["target store at the mall", "pizza"]);
        assert_eq!(result.category, CategoryLabel::Shopping);
        assert_eq!(result.keywords, vec!["target", "store", "mall"]);
    }

    #[test]
    fn test_keyword_in_either_field() {
        let result = match_category(&["12.5 gal", "shell gas station"]);
        assert_eq!(result.category, CategoryLabel::Transportation);
        assert_eq!(result.keywords, vec!["gas", "shell"]);
    }

    #[test]
    fn test_no_match_is_other() {
        let result = match_category(&["zzz", ""]);
        assert_eq!(result.category, CategoryLabel::Other);
        assert!(result.is_empty());
    }
}
