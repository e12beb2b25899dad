//! Date extraction for receipt text.

use chrono::NaiveDate;
use regex::Regex;

use super::patterns::{DATE_MDY_DASH, DATE_MDY_SLASH, DATE_YMD_DASH};
use super::{ExtractionMatch, FieldExtractor};

#[derive(Debug, Clone, Copy)]
enum Order {
    MonthDayYear,
    YearMonthDay,
}

/// Date field extractor.
///
/// Patterns are tried in priority order (`MM/DD/YYYY`, `YYYY-MM-DD`,
/// `MM-DD-YYYY`); the first pattern producing a valid calendar date wins.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    fn patterns() -> [(&'static Regex, Order); 3] {
        [
            (&*DATE_MDY_SLASH, Order::MonthDayYear),
            (&*DATE_YMD_DASH, Order::YearMonthDay),
            (&*DATE_MDY_DASH, Order::MonthDayYear),
        ]
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, order) in Self::patterns() {
            for caps in pattern.captures_iter(text) {
                let (year, month, day) = match order {
                    Order::MonthDayYear => (&caps[3], &caps[1], &caps[2]),
                    Order::YearMonthDay => (&caps[1], &caps[2], &caps[3]),
                };

                let Some(date) = to_date(year, month, day) else {
                    continue;
                };
                if results.iter().any(|r| r.value == date) {
                    continue;
                }

                let full_match = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                results.push(
                    ExtractionMatch::new(date, full_match)
                        .with_position(start, start + full_match.len()),
                );
            }
        }

        results
    }
}

fn to_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
