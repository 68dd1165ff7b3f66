//! `larder fridge ...` commands.

use larder::{CollectionId, Larder};

use super::{fridge_item, patch};
use crate::cli::FridgeCommand;
use crate::output::{OutputFormat, print_fridge};

/// Run a fridge command. Returns `true` if the store changed.
pub async fn run(
    command: &FridgeCommand,
    larder: &Larder,
    tenant: Option<&str>,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    let fridge = larder.fridge(CollectionId::fridge(tenant));

    let changed = match command {
        FridgeCommand::List => {
            print_fridge(&fridge.list().await?, format)?;
            false
        }
        FridgeCommand::Add(args) => {
            let added = fridge.add(fridge_item(args)?).await?;
            print_fridge(&[added], format)?;
            true
        }
        FridgeCommand::Remove { id } => {
            let removed = fridge.delete(id).await?;
            print_fridge(&[removed], format)?;
            true
        }
        FridgeCommand::Update(args) => {
            let updated = fridge.update(&args.id, &patch(args)).await?;
            print_fridge(&[updated], format)?;
            true
        }
    };

    Ok(changed)
}
