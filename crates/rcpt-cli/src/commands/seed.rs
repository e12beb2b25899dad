//! Seed command - add sample expenses.

use chrono::Utc;
use clap::Args;
use console::style;

use rcpt_core::store::manual_test_expense;

use super::Context;

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Add a single developer test record instead of the samples
    #[arg(long)]
    test: bool,
}

pub async fn run(args: SeedArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    if args.test {
        let record = store.append(manual_test_expense(Utc::now())).await?;
        println!(
            "{} Added test expense {} (${:.2})",
            style("✓").green(),
            record.id,
            record.total_amount
        );
        return Ok(());
    }

    match store.seed_samples().await? {
        0 => println!(
            "{} Store already has expenses; samples not added.",
            style("ℹ").blue()
        ),
        n => println!("{} Added {} sample expenses", style("✓").green(), n),
    }

    Ok(())
}
