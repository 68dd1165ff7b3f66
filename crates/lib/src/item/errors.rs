//! Error types for item payload validation.

use thiserror::Error;

/// Rejections of caller-supplied item data.
///
/// These are raised before any store access, so they are never retried.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// Identity is zero or blank
    #[error("Invalid item identity: '{id}'")]
    InvalidId { id: String },

    /// Name is empty or only whitespace
    #[error("Item name must not be empty")]
    EmptyName,

    /// Quantity must be at least one
    #[error("Item quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: u32 },

    /// A patch that sets no fields
    #[error("Update must set at least one field")]
    EmptyPatch,
}

impl ItemError {
    /// Check if this error is related to validation
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ItemError::InvalidId { .. }
                | ItemError::EmptyName
                | ItemError::InvalidQuantity { .. }
                | ItemError::EmptyPatch
        )
    }
}

// Conversion from ItemError to the main Error type
impl From<ItemError> for crate::Error {
    fn from(err: ItemError) -> Self {
        crate::Error::Item(err)
    }
}
