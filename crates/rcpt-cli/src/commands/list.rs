//! List command - show stored expenses.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use rcpt_core::models::{CategoryLabel, ExpenseRecord};
use rcpt_core::store::{ConfidenceBand, ExpenseQuery, SortKey, SortOrder, average_amount, total_amount};

use super::Context;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only this category (full label or unambiguous prefix, e.g. "food")
    #[arg(long)]
    category: Option<String>,

    /// Case-insensitive text search over merchant, category, items and amount
    #[arg(short, long)]
    search: Option<String>,

    /// Sort key: date, amount, merchant or category
    #[arg(long, default_value = "date")]
    sort: SortKey,

    /// Sort ascending instead of descending
    #[arg(long)]
    asc: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    let mut query = ExpenseQuery::new().sorted_by(
        args.sort,
        if args.asc {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        },
    );
    if let Some(category) = &args.category {
        let label = CategoryLabel::resolve(category)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", category))?;
        query = query.with_category(label);
    }
    if let Some(search) = args.search {
        query = query.with_search(search);
    }

    let records = store.query(&query).await?;
    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Wrote {} expenses to {}",
            style("✓").green(),
            records.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

pub fn format_records(records: &[ExpenseRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(records)?)),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

/// Confidence as a whole percentage, `N/A` when absent.
fn confidence_cell(record: &ExpenseRecord) -> String {
    record
        .confidence
        .map(|c| format!("{}%", (c * 100.0).round() as u32))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_csv(records: &[ExpenseRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["Date", "Merchant", "Category", "Amount", "Items", "Confidence"])?;

    for record in records {
        wtr.write_record([
            record.effective_date().format("%Y-%m-%d").to_string(),
            record.merchant_name.clone(),
            record.category.to_string(),
            format!("{:.2}", record.total_amount),
            record.line_items.join(";"),
            confidence_cell(record),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[ExpenseRecord]) -> String {
    if records.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();

    for record in records {
        let band = record
            .confidence
            .map(|c| format!(" [{} {}]", confidence_cell(record), ConfidenceBand::from_confidence(c).as_str()))
            .unwrap_or_default();

        output.push_str(&format!(
            "{}  {:<28} {:<20} ${:>9.2}{}\n",
            record.effective_date().format("%Y-%m-%d"),
            truncate(&record.merchant_name, 28),
            record.category.as_str(),
            record.total_amount,
            band
        ));
        if !record.line_items.is_empty() {
            output.push_str(&format!("            {}\n", record.line_items.join(", ")));
        }
        output.push_str(&format!("            id: {} ({})\n", record.id, record.processed_by));
    }

    output.push('\n');
    output.push_str(&format!(
        "{} expenses, total ${:.2}, average ${:.2}\n",
        records.len(),
        total_amount(records),
        average_amount(records)
    ));

    output
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
