//! Typed partial updates for item documents.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::errors::ItemError;
use crate::backend::Fields;
use crate::constants::{NAME, NOTES, QUANTITY};

/// A partial update of an item's attribute fields.
///
/// Each field is either left as-is (`None`) or replaced. Positional fields
/// are not part of a patch; they are owned by the reorder engine.
///
/// ```
/// use larder::item::ItemPatch;
///
/// let patch = ItemPatch::new().quantity(3).notes("the good kind");
/// assert!(patch.validate().is_ok());
/// assert!(ItemPatch::new().validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.notes.is_none()
    }

    /// Check the patch sets something and that what it sets is valid.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.is_empty() {
            return Err(ItemError::EmptyPatch);
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(ItemError::EmptyName);
        }
        if let Some(0) = self.quantity {
            return Err(ItemError::InvalidQuantity { quantity: 0 });
        }
        Ok(())
    }

    /// Write the present fields into `fields`, leaving everything else alone.
    pub fn apply(&self, fields: &mut Fields) {
        if let Some(name) = &self.name {
            fields.insert(NAME.to_string(), json!(name));
        }
        if let Some(quantity) = self.quantity {
            fields.insert(QUANTITY.to_string(), json!(quantity));
        }
        if let Some(notes) = &self.notes {
            fields.insert(NOTES.to_string(), json!(notes));
        }
    }
}
