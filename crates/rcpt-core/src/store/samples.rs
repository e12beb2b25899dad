//! Canned records for demos and manual testing.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{CategoryLabel, ExpenseRecord, ProcessedBy};

/// Two pipeline records, one and two days old, newest first.
pub fn sample_expenses(now: DateTime<Utc>) -> Vec<ExpenseRecord> {
    vec![
        ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            merchant_name: "Starbucks Coffee".to_string(),
            total_amount: Decimal::new(940, 2),
            date: NaiveDate::from_ymd_opt(2024, 8, 27),
            category: CategoryLabel::FoodAndDining,
            confidence: Some(0.92),
            line_items: vec!["Grande Latte".to_string(), "Chocolate Croissant".to_string()],
            reasoning: Some("Coffee shop merchant name and food items detected".to_string()),
            full_text: Some(
                "STARBUCKS STORE #1234 GRANDE LATTE $5.45 CHOCOLATE CROISSANT $3.25 TOTAL $9.40"
                    .to_string(),
            ),
            image_uri: None,
            subtotal_amount: None,
            gst_amount: None,
            created_at: now - Duration::days(1),
            processed_by: ProcessedBy::OcrLlm,
        },
        ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            merchant_name: "Shell Gas Station".to_string(),
            total_amount: Decimal::new(4863, 2),
            date: NaiveDate::from_ymd_opt(2024, 8, 26),
            category: CategoryLabel::Transportation,
            confidence: Some(0.87),
            line_items: vec!["Gasoline 12.5 GAL".to_string()],
            reasoning: Some("Gas station merchant and fuel purchase detected".to_string()),
            full_text: Some("SHELL GAS STATION GASOLINE 12.5 GAL @ $3.89 TOTAL $48.63".to_string()),
            image_uri: None,
            subtotal_amount: None,
            gst_amount: None,
            created_at: now - Duration::days(2),
            processed_by: ProcessedBy::OcrLlm,
        },
    ]
}

/// Developer test record (`processed_by = manual_test`).
pub fn manual_test_expense(now: DateTime<Utc>) -> ExpenseRecord {
    ExpenseRecord {
        id: Uuid::new_v4().to_string(),
        merchant_name: "Test Store".to_string(),
        total_amount: Decimal::new(2599, 2),
        date: Some(now.date_naive()),
        category: CategoryLabel::Shopping,
        confidence: None,
        line_items: vec!["Test Item 1".to_string(), "Test Item 2".to_string()],
        reasoning: Some("Manual test expense".to_string()),
        full_text: Some("TEST STORE\nTest Item 1 $12.99\nTest Item 2 $13.00\nTOTAL $25.99".to_string()),
        image_uri: None,
        subtotal_amount: None,
        gst_amount: None,
        created_at: now,
        processed_by: ProcessedBy::ManualTest,
    }
}
