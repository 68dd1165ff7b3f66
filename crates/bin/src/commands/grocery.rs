//! `larder grocery ...` commands.

use larder::{CollectionId, Larder};

use super::{grocery_item, patch};
use crate::cli::GroceryCommand;
use crate::output::{OutputFormat, print_grocery, print_json};

/// Run a grocery command. Returns `true` if the store changed.
pub async fn run(
    command: &GroceryCommand,
    larder: &Larder,
    tenant: Option<&str>,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    let list = larder.grocery_list(CollectionId::grocery(tenant));

    let changed = match command {
        GroceryCommand::List => {
            print_grocery(&list.list().await?, format)?;
            false
        }
        GroceryCommand::Add {
            item,
            position,
            active,
        } => {
            let new_item = grocery_item(item)?.with_active(*active);
            let created = match position {
                Some(position) => list.insert(new_item, *position).await?,
                None => list.push(new_item).await?,
            };
            print_grocery(&[created], format)?;
            true
        }
        GroceryCommand::Remove { id } => {
            let removed = list.delete(id).await?;
            print_grocery(&[removed], format)?;
            true
        }
        GroceryCommand::Move { from, to } => {
            list.move_item(*from, *to).await?;
            print_grocery(&list.list().await?, format)?;
            true
        }
        GroceryCommand::Toggle { id } => {
            let toggled = list.toggle_active(id).await?;
            print_grocery(&[toggled], format)?;
            true
        }
        GroceryCommand::Update(args) => {
            let updated = list.update(&args.id, &patch(args)).await?;
            print_grocery(&[updated], format)?;
            true
        }
        GroceryCommand::Checkout => {
            let fridge = larder.fridge(CollectionId::fridge(tenant));
            // A partial migration still changed the store; save before reporting it
            let report = match list.migrate_active(&fridge).await {
                Ok(report) => report,
                Err(err) if err.is_partial_migration() => {
                    return Err(Box::new(PartialCheckout(err)));
                }
                Err(err) => return Err(err.into()),
            };
            match format {
                OutputFormat::Human => println!(
                    "Moved {} item(s) to the fridge, renumbered {}.",
                    report.count(),
                    report.renumbered
                ),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "migrated": &report.migrated,
                    "renumbered": report.renumbered,
                }))?,
            }
            report.count() > 0
        }
        GroceryCommand::Verify => {
            list.verify().await?;
            let len = list.len().await?;
            match format {
                OutputFormat::Human => println!("{len} item(s), positions 1..={len} intact."),
                OutputFormat::Json => print_json(&serde_json::json!({ "len": len, "dense": true }))?,
            }
            false
        }
    };

    Ok(changed)
}

/// A checkout that moved some items before failing.
#[derive(Debug)]
pub struct PartialCheckout(pub larder::Error);

impl std::fmt::Display for PartialCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for PartialCheckout {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
