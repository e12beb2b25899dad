//! Add command - record an expense by hand.

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;

use rcpt_core::{LineItemInput, ManualEntry, record_manual_entry};

use super::Context;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Merchant name
    #[arg(short, long)]
    merchant: String,

    /// Category (full label or unambiguous prefix, e.g. "food")
    #[arg(short, long)]
    category: String,

    /// Line item as NAME=PRICE; repeat for several items
    #[arg(short, long = "item", value_parser = parse_item, required = true)]
    items: Vec<LineItemInput>,

    /// GST/tax amount added to the item subtotal
    #[arg(long, value_parser = parse_amount)]
    gst: Option<Decimal>,

    /// Expense date (YYYY-MM-DD, default: today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
    s.trim()
        .trim_start_matches('$')
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{}': {}", s, e))
}

fn parse_item(s: &str) -> Result<LineItemInput, String> {
    let (name, price) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=PRICE, got '{}'", s))?;
    Ok(LineItemInput::new(name.trim(), parse_amount(price)?))
}

pub async fn run(args: AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    let entry = ManualEntry {
        merchant: args.merchant,
        category: args.category,
        date: args.date,
        line_items: args.items,
        gst_amount: args.gst,
    };

    let record = record_manual_entry(&store, entry).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!(
            "{} Added {} expense at {}: ${:.2}",
            style("✓").green(),
            record.category,
            record.merchant_name,
            record.total_amount
        );
        println!("   id: {}", record.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        let item = parse_item("Latte = $4.50").unwrap();
        assert_eq!(item.name, "Latte");
        assert_eq!(item.price, Decimal::new(450, 2));

        let item = parse_item("A=B=1").unwrap();
        assert_eq!(item.name, "A=B");

        assert!(parse_item("Latte").is_err());
        assert!(parse_item("Latte=abc").is_err());
    }
}
