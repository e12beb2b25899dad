//! Stats command - totals, categorization accuracy and monthly breakdown.

use clap::Args;
use console::style;
use serde_json::json;

use rcpt_core::store::{AccuracyStats, StoreSummary, monthly_breakdown};

use super::Context;

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: StatsArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    let records = store.list().await?;
    let summary = StoreSummary::from_records(&records);
    let accuracy = AccuracyStats::from_records(&records);
    let months = monthly_breakdown(&records);

    if args.json {
        let months: Vec<_> = months
            .iter()
            .map(|(month, categories)| {
                json!({
                    "month": month,
                    "categories": categories
                        .iter()
                        .map(|(label, amount)| (label.to_string(), json!(amount)))
                        .collect::<serde_json::Map<_, _>>(),
                })
            })
            .collect();

        let value = json!({
            "summary": summary,
            "accuracy": accuracy,
            "monthly": months,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", style("Summary").bold());
    println!("  Expenses:        {}", summary.expense_count);
    println!("  From receipts:   {}", summary.ocr_count);
    println!("  Total:           ${:.2}", summary.total_amount);
    println!();

    println!("{}", style("Categorization").bold());
    if accuracy.total == 0 {
        println!("  No processed receipts yet");
    } else {
        println!(
            "  High confidence: {}/{} ({:.0}%)",
            accuracy.high_confidence,
            accuracy.total,
            accuracy.accuracy * 100.0
        );
    }

    if !months.is_empty() {
        println!();
        println!("{}", style("By month").bold());
        for (month, categories) in &months {
            println!("  {}", style(month).cyan());
            for (label, amount) in categories {
                println!("    {:<20} ${:>9.2}", label.as_str(), amount);
            }
        }
    }

    Ok(())
}
