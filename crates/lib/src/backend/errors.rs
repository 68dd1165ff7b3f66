//! Document store error types for the Larder backend.
//!
//! This module defines structured error types for document store operations,
//! separating transient failures (write conflicts, outages) that are safe to
//! retry from permanent ones that must be surfaced to the caller.

use thiserror::Error;

use crate::backend::DocKey;

/// Errors that can occur during document store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// A document read inside the transaction changed before it committed.
    ///
    /// Nothing from the transaction was applied; the whole operation may be
    /// retried from scratch.
    #[error("Write conflict in collection '{collection}': {reason}")]
    Conflict {
        /// The collection holding the conflicting document or query
        collection: String,
        /// Description of what changed underneath the transaction
        reason: String,
    },

    /// Transport-level failure reaching the store.
    #[error("Document store unavailable: {reason}")]
    Unavailable {
        /// Description of the outage
        reason: String,
    },

    /// A create targeted a key that already holds a document.
    #[error("Document already exists in '{collection}': {key}")]
    AlreadyExists {
        /// The collection that was written
        collection: String,
        /// The key that was already taken
        key: DocKey,
    },

    /// An update or delete targeted a key that holds no document.
    #[error("Document not found in '{collection}': {key}")]
    DocumentNotFound {
        /// The collection that was written
        collection: String,
        /// The missing key
        key: DocKey,
    },

    /// A stored document is missing a field the caller requires, or holds
    /// it with the wrong type.
    #[error("Malformed document {key} in '{collection}': {reason}")]
    MalformedDocument {
        /// The collection holding the document
        collection: String,
        /// The offending document key
        key: DocKey,
        /// What was wrong with it
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error is a write-write conflict detected at commit.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Conflict { .. })
    }

    /// Check if this error is a transport-level outage.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable { .. })
    }

    /// Check if retrying the whole operation could succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict() || self.is_unavailable()
    }

    /// Check if this error indicates a document was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::DocumentNotFound { .. })
    }

    /// Check if this error indicates a create collided with an existing document.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, BackendError::AlreadyExists { .. })
    }

    /// Check if this error indicates stored data does not have the expected shape.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::MalformedDocument { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Get the collection name if this error is about a specific collection.
    pub fn collection(&self) -> Option<&str> {
        match self {
            BackendError::Conflict { collection, .. }
            | BackendError::AlreadyExists { collection, .. }
            | BackendError::DocumentNotFound { collection, .. }
            | BackendError::MalformedDocument { collection, .. } => Some(collection),
            _ => None,
        }
    }

    /// Get the document key if this error is about a specific document.
    pub fn key(&self) -> Option<&DocKey> {
        match self {
            BackendError::AlreadyExists { key, .. }
            | BackendError::DocumentNotFound { key, .. }
            | BackendError::MalformedDocument { key, .. } => Some(key),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
