//! Delete command - remove one expense.

use clap::Args;
use console::style;

use super::Context;

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Expense id
    id: String,
}

pub async fn run(args: DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    if !store.remove(&args.id).await? {
        anyhow::bail!("Expense not found: {}", args.id);
    }

    println!("{} Deleted expense {}", style("✓").green(), args.id);
    Ok(())
}
