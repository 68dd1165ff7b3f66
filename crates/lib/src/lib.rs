//!
//! Larder: dense, gap-free list ordering on top of a schemaless document store.
//!
//! A grocery list is an *ordered* collection: every item document carries a
//! 1-based `position` and, between completed operations, the positions of a
//! list of N items are exactly `{1, ..., N}`. There is no central counter;
//! the order is whatever the documents say, so every operation that changes
//! it rewrites the affected documents in one atomic commit.
//!
//! ## Core Concepts
//!
//! * **Document store (`backend::DocumentStore`)**: Collections of schemaless
//!   documents with field queries and an optimistic, read-validated commit.
//!   `backend::database::InMemory` is the bundled implementation.
//! * **Transactions (`transaction::Transaction`)**: Record every read and
//!   stage every write so the store can reject the commit if anything read
//!   has changed, including which documents a query matched.
//! * **Reorder engine (`reorder`)**: Insert, delete and move as a contiguous
//!   position shift plus one direct write.
//! * **Compaction engine (`compaction`)**: Renumbers survivors after a batch
//!   of removals.
//! * **Migration engine (`migration`)**: Moves the active subset of a grocery
//!   list into an unordered fridge collection, then compacts the list.
//! * **Handles (`Larder`, `list::GroceryList`, `list::Fridge`)**: The entry
//!   points, running each operation as a retried transaction with a deadline.

pub mod backend;
pub mod clock;
pub mod collection;
pub mod compaction;
pub mod config;
pub mod constants;
pub mod index;
pub mod instance;
pub mod item;
pub mod list;
pub mod migration;
pub mod reorder;
pub mod retry;
pub mod transaction;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use collection::CollectionId;
pub use config::LarderConfig;
pub use instance::Larder;
pub use item::{FridgeItem, GroceryItem, ItemId, ItemPatch, NewFridgeItem, NewGroceryItem, Position};
pub use list::{Fridge, GroceryList};
pub use migration::{MigrationMode, MigrationReport};

/// Result type used throughout the Larder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Larder library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured store errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured errors from the transaction machinery
    #[error(transparent)]
    Transaction(transaction::TransactionError),

    /// Rejected item payloads
    #[error(transparent)]
    Item(item::ItemError),

    /// Positional list errors from the engines
    #[error(transparent)]
    List(list::ListError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Backend(_) => "backend",
            Error::Transaction(_) => "transaction",
            Error::Item(_) => "item",
            Error::List(_) => "list",
        }
    }

    /// Check if repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error is a write conflict detected at commit.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if the store could not be reached.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::List(list_err) => list_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if a create hit an existing document.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_already_exists(),
            Error::List(list::ListError::DuplicateIdentity { .. }) => true,
            _ => false,
        }
    }

    /// Check if the caller supplied input the operation can never accept.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Item(item_err) => item_err.is_validation_error(),
            Error::List(list_err) => list_err.is_invalid_input(),
            _ => false,
        }
    }

    /// Check if this error indicates stored data violates an invariant.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            Error::List(list_err) => list_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if a migration stopped part way.
    pub fn is_partial_migration(&self) -> bool {
        match self {
            Error::List(list_err) => list_err.is_partial_migration(),
            _ => false,
        }
    }

    /// Check if this error indicates a transaction was used after commit.
    pub fn is_already_committed(&self) -> bool {
        match self {
            Error::Transaction(tx_err) => tx_err.is_already_committed(),
            _ => false,
        }
    }

    /// Check if this error indicates a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transaction(tx_err) => tx_err.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
