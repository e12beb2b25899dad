//! Clear command - remove every stored expense.

use clap::Args;
use console::style;

use super::Context;

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Required; clearing cannot be undone
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ClearArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    if !args.force {
        let count = store.count().await.unwrap_or(0);
        anyhow::bail!(
            "This deletes all {} expenses and cannot be undone. Use --force to proceed.",
            count
        );
    }

    let removed = store.clear().await?;
    println!("{} Cleared {} expenses", style("✓").green(), removed);
    Ok(())
}
