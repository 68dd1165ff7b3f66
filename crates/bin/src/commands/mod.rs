//! Command implementations. Each returns whether it changed the store.

pub mod fridge;
pub mod grocery;

use larder::{ItemPatch, NewFridgeItem, NewGroceryItem};

use crate::cli::{ItemArgs, PatchArgs};

fn grocery_item(args: &ItemArgs) -> larder::Result<NewGroceryItem> {
    let item = NewGroceryItem::new(args.id.clone(), args.name.clone(), args.quantity)?;
    Ok(match &args.notes {
        Some(notes) => item.with_notes(notes.clone()),
        None => item,
    })
}

fn fridge_item(args: &ItemArgs) -> larder::Result<NewFridgeItem> {
    let item = NewFridgeItem::new(args.id.clone(), args.name.clone(), args.quantity)?;
    Ok(match &args.notes {
        Some(notes) => item.with_notes(notes.clone()),
        None => item,
    })
}

fn patch(args: &PatchArgs) -> ItemPatch {
    ItemPatch {
        name: args.name.clone(),
        quantity: args.quantity,
        notes: args.notes.clone(),
    }
}
