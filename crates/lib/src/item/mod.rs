//! Item payloads.
//!
//! The engine stores items as schemaless documents and only interprets the
//! identity, `position` and `active` fields. The types here are the typed
//! view callers use to build and read those documents.

pub mod errors;
mod patch;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use errors::ItemError;
pub use patch::ItemPatch;

use crate::backend::{DocKey, Fields};
use crate::constants::{ACTIVE, ADDED, ITEM_ID, NAME, NOTES, POSITION, QUANTITY};

/// 1-based position within an ordered collection.
pub type Position = u32;

/// Stable, externally assigned identity of an item.
///
/// Integer and string identities are both accepted. They never compare equal
/// to each other, so `7` and `"7"` are different items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl ItemId {
    /// Reject the zero identity and blank strings.
    pub fn validate(&self) -> Result<(), ItemError> {
        let valid = match self {
            ItemId::Int(id) => *id != 0,
            ItemId::Text(id) => !id.trim().is_empty(),
        };
        if valid {
            Ok(())
        } else {
            Err(ItemError::InvalidId {
                id: self.to_string(),
            })
        }
    }

    /// The identity as stored in the `item_id` field.
    pub fn to_value(&self) -> Value {
        match self {
            ItemId::Int(id) => json!(id),
            ItemId::Text(id) => json!(id),
        }
    }

    /// Read an identity back from a stored field value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ItemId::Int),
            Value::String(s) => Some(ItemId::Text(s.clone())),
            _ => None,
        }
    }

    /// Document key used for the item in unordered collections.
    pub fn doc_key(&self) -> DocKey {
        DocKey::new(self.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{id}"),
            ItemId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Int(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Text(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId::Text(id)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    /// Numeric strings become integer identities, anything else stays text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(ItemId::Int)
            .unwrap_or_else(|_| ItemId::Text(s.to_string())))
    }
}

/// An item in an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub active: bool,
    pub position: Position,
}

/// An item in an unordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FridgeItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
    pub added: DateTime<Utc>,
}

fn validate_common(item_id: &ItemId, name: &str, quantity: u32) -> Result<(), ItemError> {
    item_id.validate()?;
    if name.trim().is_empty() {
        return Err(ItemError::EmptyName);
    }
    if quantity == 0 {
        return Err(ItemError::InvalidQuantity { quantity });
    }
    Ok(())
}

/// A validated payload for inserting into an ordered collection.
///
/// ```
/// use larder::item::NewGroceryItem;
///
/// let item = NewGroceryItem::new(1_i64, "oats", 2).unwrap().with_active(true);
/// assert!(item.active);
/// assert!(NewGroceryItem::new(0_i64, "oats", 2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroceryItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub notes: String,
    pub active: bool,
    /// Opaque caller fields stored alongside the item
    pub extra: Fields,
}

impl NewGroceryItem {
    pub fn new(
        item_id: impl Into<ItemId>,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, ItemError> {
        let item_id = item_id.into();
        let name = name.into();
        validate_common(&item_id, &name, quantity)?;
        Ok(Self {
            item_id,
            name,
            quantity,
            notes: String::new(),
            active: false,
            extra: Fields::new(),
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Attach an opaque field. Names the engine owns are overwritten on store.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Render the stored document for this item at `position`.
    pub(crate) fn into_fields(self, position: Position) -> Fields {
        let mut fields = self.extra;
        fields.insert(ITEM_ID.to_string(), self.item_id.to_value());
        fields.insert(NAME.to_string(), json!(self.name));
        fields.insert(QUANTITY.to_string(), json!(self.quantity));
        fields.insert(NOTES.to_string(), json!(self.notes));
        fields.insert(ACTIVE.to_string(), json!(self.active));
        fields.insert(POSITION.to_string(), json!(position));
        fields
    }
}

/// A validated payload for adding to an unordered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFridgeItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub notes: String,
}

impl NewFridgeItem {
    pub fn new(
        item_id: impl Into<ItemId>,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, ItemError> {
        let item_id = item_id.into();
        let name = name.into();
        validate_common(&item_id, &name, quantity)?;
        Ok(Self {
            item_id,
            name,
            quantity,
            notes: String::new(),
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub(crate) fn into_fields(self, added: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert(ITEM_ID.to_string(), self.item_id.to_value());
        fields.insert(NAME.to_string(), json!(self.name));
        fields.insert(QUANTITY.to_string(), json!(self.quantity));
        fields.insert(NOTES.to_string(), json!(self.notes));
        fields.insert(ADDED.to_string(), json!(added));
        fields
    }
}
