//! Backend implementations for Larder storage
//!
//! This module provides the core `DocumentStore` trait and the backend
//! implementations organized by category.
//!
//! The `DocumentStore` trait is the only thing the positional-index engine
//! knows about storage: schemaless documents grouped into named collections,
//! field queries, and an atomic commit of a batch of writes guarded by the
//! set of reads that produced them. This keeps the reorder, compaction and
//! migration logic independent of the specific storage mechanism.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;

pub mod database;
pub mod errors;
mod types;

pub use errors::BackendError;
pub use types::{CommitReceipt, DocKey, Document, Fields, Filter, QueryRead, ReadSet, Write};

/// Document store abstraction consumed by the positional-index engine.
///
/// Implementations must make [`commit`](DocumentStore::commit) atomic with
/// respect to every other commit: either all writes become visible together
/// or none do. The only isolation offered is for what the transaction itself
/// recorded in its [`ReadSet`]; anything the caller read outside of it is
/// not protected.
///
/// All store implementations must be `Send` and `Sync` to allow sharing
/// across tasks, and implement `Any` to allow downcasting (e.g. to persist an
/// in-memory store on shutdown).
#[async_trait]
pub trait DocumentStore: Send + Sync + Any {
    /// Fetch a single document by key, `None` if absent.
    async fn get(&self, collection: &str, key: &DocKey) -> Result<Option<Document>>;

    /// Return every document in `collection` matching `filter`, ordered by key.
    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Atomically apply `writes` if nothing recorded in `reads` has changed.
    ///
    /// # Errors
    /// - `BackendError::Conflict` if any point read or query result changed;
    ///   nothing is applied.
    /// - `BackendError::AlreadyExists` / `BackendError::DocumentNotFound` if
    ///   a write does not fit the current state; nothing is applied.
    /// - `BackendError::Unavailable` on transport failure; nothing is applied.
    async fn commit(&self, reads: ReadSet, writes: Vec<Write>) -> Result<CommitReceipt>;

    /// Names of all collections that currently hold at least one document.
    async fn collections(&self) -> Result<Vec<String>>;

    /// Returns a reference to the store as `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
