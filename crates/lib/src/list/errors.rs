//! Error types for positional list operations.
//!
//! Store-level failures (conflicts, outages) stay as
//! [`BackendError`](crate::backend::BackendError); these are the failures
//! the engine itself detects.

use thiserror::Error;

use crate::item::{ItemId, Position};

/// Errors raised by the reorder, compaction and migration engines.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Insert target outside `1..=len + 1`
    #[error("Position {position} is out of range for '{collection}' (valid: 1..={max})")]
    InvalidPosition {
        collection: String,
        position: Position,
        max: usize,
    },

    /// Move endpoints outside `1..=len`, or equal
    #[error("Cannot move {from} -> {to} in '{collection}' holding {len} items")]
    InvalidRange {
        collection: String,
        from: Position,
        to: Position,
        len: usize,
    },

    /// No document carries the identity
    #[error("Item '{item_id}' not found in '{collection}'")]
    NotFound { collection: String, item_id: ItemId },

    /// More than one document matched a lookup that must be unique
    #[error("{matches} documents match {target} in '{collection}'")]
    AmbiguousIdentity {
        collection: String,
        /// What was looked up, e.g. "item_id 7" or "position 3"
        target: String,
        matches: usize,
    },

    /// Insert of an identity the list already holds
    #[error("Item '{item_id}' already exists in '{collection}'")]
    DuplicateIdentity { collection: String, item_id: ItemId },

    /// Item-by-item migration stopped part way
    ///
    /// The source list is dense; `migrated` are in the destination and
    /// `failed` are still in the source.
    #[error(
        "Migration from '{source_collection}' moved {} item(s) and left {}: {reason}",
        .migrated.len(),
        .failed.len()
    )]
    PartialMigration {
        source_collection: String,
        migrated: Vec<ItemId>,
        /// The item that failed, then every item not yet attempted
        failed: Vec<ItemId>,
        reason: String,
    },

    /// Stored positions are not exactly `1..=len`
    #[error(
        "Positions in '{collection}' are not dense over {len} items (missing {missing:?}, duplicated {duplicates:?})"
    )]
    IndexCorrupted {
        collection: String,
        len: usize,
        missing: Vec<Position>,
        duplicates: Vec<Position>,
    },
}

impl ListError {
    /// Check if the caller supplied something the list can never accept
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ListError::InvalidPosition { .. }
                | ListError::InvalidRange { .. }
                | ListError::DuplicateIdentity { .. }
        )
    }

    /// Check if this error indicates a resource was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListError::NotFound { .. })
    }

    /// Check if this error indicates stored data breaks an invariant
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            ListError::AmbiguousIdentity { .. } | ListError::IndexCorrupted { .. }
        )
    }

    /// Check if a migration was left half done
    pub fn is_partial_migration(&self) -> bool {
        matches!(self, ListError::PartialMigration { .. })
    }

    /// Get the collection name if this error is collection-specific
    pub fn collection(&self) -> &str {
        match self {
            ListError::InvalidPosition { collection, .. }
            | ListError::InvalidRange { collection, .. }
            | ListError::NotFound { collection, .. }
            | ListError::AmbiguousIdentity { collection, .. }
            | ListError::DuplicateIdentity { collection, .. }
            | ListError::IndexCorrupted { collection, .. } => collection,
            ListError::PartialMigration {
                source_collection, ..
            } => source_collection,
        }
    }
}

// Conversion from ListError to the main Error type
impl From<ListError> for crate::Error {
    fn from(err: ListError) -> Self {
        crate::Error::List(err)
    }
}
