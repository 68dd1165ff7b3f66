//! CLI argument definitions for the Larder binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use larder::{ItemId, Position};

/// How `grocery checkout` commits
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Migration {
    /// All items or none, in one transaction
    Atomic,
    /// One transaction per item; may stop part way
    PerItem,
}

/// Larder grocery list and fridge inventory
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(about = "Larder: an ordered grocery list and a fridge inventory on a JSON document store")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store lives and how operations against it behave
#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// Data directory holding larder.json
    #[arg(short = 'D', long, global = true, env = "LARDER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Scope collections to users/<tenant>/...
    #[arg(short, long, global = true, env = "LARDER_TENANT")]
    pub tenant: Option<String>,

    /// Per-operation deadline in milliseconds (0 disables it)
    #[arg(long, global = true, env = "LARDER_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Retries on write conflict before giving up
    #[arg(long, global = true, env = "LARDER_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Commit mode for checkout
    #[arg(long, global = true, value_enum, default_value = "atomic")]
    pub migration: Migration,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with the ordered grocery list
    Grocery {
        #[command(subcommand)]
        command: GroceryCommand,
    },
    /// Work with the fridge inventory
    Fridge {
        #[command(subcommand)]
        command: FridgeCommand,
    },
}

/// Attribute fields shared by add commands
#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Item identity (integers stay integers)
    pub id: ItemId,

    /// Display name
    pub name: String,

    #[arg(short, long, default_value_t = 1)]
    pub quantity: u32,

    #[arg(short, long)]
    pub notes: Option<String>,
}

/// Fields to change on update
#[derive(clap::Args, Debug)]
pub struct PatchArgs {
    pub id: ItemId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub quantity: Option<u32>,

    #[arg(short, long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GroceryCommand {
    /// Show the list in order
    List,
    /// Add an item, at the end unless --position is given
    Add {
        #[command(flatten)]
        item: ItemArgs,

        /// 1-based position to insert at
        #[arg(short, long)]
        position: Option<Position>,

        /// Mark the item for checkout right away
        #[arg(long)]
        active: bool,
    },
    /// Remove an item by identity
    Remove { id: ItemId },
    /// Move the item at FROM to TO
    Move { from: Position, to: Position },
    /// Flip whether an item is marked for checkout
    Toggle { id: ItemId },
    /// Change an item's name, quantity or notes
    Update(PatchArgs),
    /// Move every marked item into the fridge
    Checkout,
    /// Check that positions are gap-free
    Verify,
}

#[derive(Subcommand, Debug)]
pub enum FridgeCommand {
    /// Show the fridge, oldest first
    List,
    /// Add an item directly to the fridge
    Add(ItemArgs),
    /// Remove an item by identity
    Remove { id: ItemId },
    /// Change an item's name, quantity or notes
    Update(PatchArgs),
}
