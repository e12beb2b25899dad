//! Common regex patterns for receipt text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amounts, lenient: "$5.45", "5.45", "1234", "5."
    pub static ref AMOUNT_LENIENT: Regex = Regex::new(
        r"\$?\d+\.?\d{0,2}"
    ).unwrap();

    // Amounts, strict: "$5", "$5.45", "5.45"
    pub static ref AMOUNT_STRICT: Regex = Regex::new(
        r"\$\d+(?:\.\d{1,2})?|\b\d+\.\d{2}\b"
    ).unwrap();

    // Dates, in lookup priority order
    pub static ref DATE_MDY_SLASH: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"
    ).unwrap();

    pub static ref DATE_YMD_DASH: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MDY_DASH: Regex = Regex::new(
        r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b"
    ).unwrap();

    // Item description in capitals followed by a price
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"[A-Z ]{4,}\$?\d+(?:\.\d{1,2})?"
    ).unwrap();

    // Summary rows that are never line items
    pub static ref SUMMARY_ROW: Regex = Regex::new(
        r"TOTAL|TAX|SUBTOTAL"
    ).unwrap();

    // Markdown code fence around a model answer
    pub static ref CODE_FENCE: Regex = Regex::new(
        r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$"
    ).unwrap();
}
