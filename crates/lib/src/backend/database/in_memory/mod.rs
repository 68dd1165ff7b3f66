//! In-memory document store implementation
//!
//! This module provides an in-memory implementation of the DocumentStore trait,
//! suitable for testing, development, the CLI, or scenarios where durability is
//! handled externally by saving the whole state to a file.

#[cfg(any(test, feature = "testing"))]
mod faults;
mod persistence;
mod storage;

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{CommitReceipt, DocKey, Document, DocumentStore, Fields, Filter, ReadSet, Write};

#[cfg(any(test, feature = "testing"))]
pub use faults::InjectedFault;

/// Documents of one collection, ordered by key.
pub(crate) type CollectionMap = BTreeMap<DocKey, StoredDocument>;

/// A document as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredDocument {
    pub(crate) version: u64,
    pub(crate) fields: Fields,
}

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) collections: HashMap<String, CollectionMap>,
    /// Sequence number of the last applied commit.
    pub(crate) sequence: u64,
}

/// A simple in-memory document store.
///
/// Collections are `BTreeMap`s of documents behind a single read-write lock.
/// Every commit takes the write lock, validates the transaction's read set
/// against the current state and then applies its writes without suspending,
/// so a commit is either fully visible or not at all, even if the caller's
/// future is dropped while waiting for the lock.
///
/// It provides basic persistence via `save_to_file` and `load_from_file`,
/// serializing the whole state to JSON.
#[derive(Debug)]
pub struct InMemory {
    pub(crate) state: RwLock<StoreState>,
    #[cfg(any(test, feature = "testing"))]
    pub(crate) faults: std::sync::Mutex<faults::FaultPlan>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            #[cfg(any(test, feature = "testing"))]
            faults: std::sync::Mutex::new(faults::FaultPlan::default()),
        }
    }

    pub(crate) fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
            #[cfg(any(test, feature = "testing"))]
            faults: std::sync::Mutex::new(faults::FaultPlan::default()),
        }
    }

    /// Sequence number of the last applied commit (0 for a fresh store).
    pub async fn sequence(&self) -> u64 {
        self.state.read().await.sequence
    }

    /// Number of documents currently held in `collection`.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, |docs| docs.len())
    }

    /// Saves the entire store state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the store state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` store is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` store or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn get(&self, collection: &str, key: &DocKey) -> Result<Option<Document>> {
        Ok(storage::get(self, collection, key).await)
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        Ok(storage::query(self, collection, filter).await)
    }

    async fn commit(&self, reads: ReadSet, writes: Vec<Write>) -> Result<CommitReceipt> {
        #[cfg(any(test, feature = "testing"))]
        faults::before_commit(self, &writes).await?;

        storage::commit(self, reads, writes).await
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
