//! Prompt construction and response parsing for remote categorization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::rules::parse_amount;
use super::rules::patterns::CODE_FENCE;
use crate::error::CategorizationError;
use crate::models::{CategoryLabel, ExpenseFields, NormalizedReceipt};

/// Build the categorization prompt for a receipt.
pub fn build_prompt(receipt: &NormalizedReceipt) -> String {
    let amounts = receipt
        .amounts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Analyze this receipt text and extract the following information:

Receipt Text: "{full_text}"
Merchant Info: "{merchant}"
Found Amounts: {amounts}

Please respond in JSON format with:
{{
  "merchant_name": "extracted merchant name",
  "total_amount": "most likely total amount as number",
  "date": "date in YYYY-MM-DD format if found, or null",
  "category": "one of: {categories}",
  "confidence": "confidence score 0-1",
  "line_items": ["array of individual items if identifiable"],
  "reasoning": "brief explanation for category choice"
}}

Guidelines:
- Choose the highest amount as total_amount unless context suggests otherwise
- Use merchant name and items to determine category
- Be conservative with confidence if text is unclear
"#,
        full_text = receipt.full_text,
        merchant = receipt.merchant_info,
        amounts = amounts,
        categories = CategoryLabel::joined(),
    )
}

/// Loosely typed model answer; every field is validated afterwards.
#[derive(Debug, Deserialize)]
struct RawFields {
    #[serde(default)]
    merchant_name: Option<String>,
    total_amount: Value,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: Value,
    #[serde(default)]
    line_items: Vec<Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parse the model answer into expense fields.
///
/// Code fences are tolerated. Unknown categories become `Other`, confidence
/// is clamped to `[0, 1]` and a missing or negative total is a parse error.
pub fn parse_response(
    answer: &str,
    max_line_items: usize,
) -> Result<ExpenseFields, CategorizationError> {
    let answer = answer.trim();
    let json = CODE_FENCE
        .captures(answer)
        .and_then(|caps| caps.get(1))
        .map_or(answer, |m| m.as_str());

    let raw: RawFields =
        serde_json::from_str(json).map_err(|e| CategorizationError::Parse(e.to_string()))?;

    let total_amount = value_to_decimal(&raw.total_amount).ok_or_else(|| {
        CategorizationError::Parse(format!("invalid total_amount: {}", raw.total_amount))
    })?;
    if total_amount < Decimal::ZERO {
        return Err(CategorizationError::Parse(format!(
            "negative total_amount: {}",
            total_amount
        )));
    }

    let category = raw
        .category
        .as_deref()
        .and_then(|c| c.parse::<CategoryLabel>().ok())
        .unwrap_or_default();

    let confidence = value_to_f32(&raw.confidence).unwrap_or(0.0).clamp(0.0, 1.0);

    let date = raw
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    let line_items = raw
        .line_items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .take(max_line_items)
        .collect();

    Ok(ExpenseFields {
        merchant_name: raw.merchant_name.unwrap_or_default().trim().to_string(),
        total_amount,
        date,
        category,
        confidence,
        line_items,
        reasoning: raw.reasoning.unwrap_or_default(),
    })
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
            n.as_f64().and_then(|f| Decimal::try_from(f).ok())
        }),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn value_to_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
