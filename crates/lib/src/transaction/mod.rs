//! Transaction system for atomic document store modifications
//!
//! A [`Transaction`] is an optimistic unit of work: it reads through to the
//! store while recording what it saw, stages writes locally, and hands both to
//! [`DocumentStore::commit`] at the end. The store applies the writes only if
//! every recorded read is still current, so discovery queries (how many items
//! are in the list, which items sit at or after a position) are protected by
//! the same commit that acts on them.
//!
//! # Read-your-writes
//!
//! Reads issued after a write in the same transaction see the staged state
//! overlaid on the store's committed state. The read set always records the
//! committed state, since that is what the store validates against.

pub mod errors;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

pub use errors::TransactionError;

use crate::{
    Result,
    backend::{CommitReceipt, DocKey, Document, DocumentStore, Fields, Filter, ReadSet, Write},
};

#[derive(Debug, Default)]
struct TransactionState {
    reads: ReadSet,
    writes: Vec<Write>,
    /// Final staged state of each written document; `None` marks a delete.
    staged: BTreeMap<(String, DocKey), Option<Fields>>,
}

/// Represents a single, atomic transaction against a `DocumentStore`.
///
/// `Transaction` is a cheap-to-clone handle; clones share the same staged
/// state. It can be committed once; any use after that fails with
/// [`TransactionError::TransactionAlreadyCommitted`].
///
/// Transactions are normally created by [`crate::retry::run`], which also
/// commits them and retries the whole unit of work on conflict.
#[derive(Clone)]
pub struct Transaction {
    /// Staged state, `None` once committed
    state: Arc<Mutex<Option<TransactionState>>>,
    store: Arc<dyn DocumentStore>,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .state
            .lock()
            .unwrap()
            .as_ref()
            .map(|state| state.writes.len());
        f.debug_struct("Transaction")
            .field("store", &"<DocumentStore>")
            .field("pending_writes", &pending)
            .finish()
    }
}

impl Transaction {
    /// Open a new transaction against `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(TransactionState::default()))),
            store,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TransactionState) -> R) -> Result<R> {
        let mut guard = self.state.lock().unwrap();
        let state = guard
            .as_mut()
            .ok_or(TransactionError::TransactionAlreadyCommitted)?;
        Ok(f(state))
    }

    /// Whether `commit` has already been called.
    pub fn is_committed(&self) -> bool {
        self.state.lock().unwrap().is_none()
    }

    /// Number of writes staged so far.
    pub fn pending_writes(&self) -> Result<usize> {
        self.with_state(|state| state.writes.len())
    }

    /// Fetch a document by key, seeing this transaction's staged writes.
    pub async fn get(&self, collection: &str, key: &DocKey) -> Result<Option<Document>> {
        let slot = (collection.to_string(), key.clone());
        if let Some(staged) = self.with_state(|state| state.staged.get(&slot).cloned())? {
            return Ok(staged.map(|fields| Document {
                key: key.clone(),
                version: 0,
                fields,
            }));
        }

        let doc = self.store.get(collection, key).await?;
        self.with_state(|state| {
            state
                .reads
                .record_point(collection, key, doc.as_ref().map(|d| d.version))
        })?;
        Ok(doc)
    }

    /// Run a field query, seeing this transaction's staged writes.
    ///
    /// The committed result is recorded in the read set, so the commit fails
    /// with a conflict if any document starts or stops matching, or changes,
    /// before then.
    pub async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        // Fail before touching the store if already committed
        self.with_state(|_| ())?;

        let committed = self.store.query(collection, filter).await?;
        self.with_state(|state| {
            state.reads.record_query(collection, filter, &committed);

            let mut merged: BTreeMap<DocKey, Document> = committed
                .into_iter()
                .filter(|doc| {
                    !state
                        .staged
                        .contains_key(&(collection.to_string(), doc.key.clone()))
                })
                .map(|doc| (doc.key.clone(), doc))
                .collect();

            for ((name, key), fields) in &state.staged {
                if name == collection
                    && let Some(fields) = fields
                    && filter.matches(fields)
                {
                    merged.insert(
                        key.clone(),
                        Document {
                            key: key.clone(),
                            version: 0,
                            fields: fields.clone(),
                        },
                    );
                }
            }

            merged.into_values().collect()
        })
    }

    /// Stage creation of a new document.
    pub fn create(&self, collection: &str, key: DocKey, fields: Fields) -> Result<()> {
        self.stage(Write::Create {
            collection: collection.to_string(),
            key,
            fields,
        })
    }

    /// Stage replacement of an existing document's fields.
    pub fn update(&self, collection: &str, key: DocKey, fields: Fields) -> Result<()> {
        self.stage(Write::Update {
            collection: collection.to_string(),
            key,
            fields,
        })
    }

    /// Stage removal of an existing document.
    pub fn delete(&self, collection: &str, key: DocKey) -> Result<()> {
        self.stage(Write::Delete {
            collection: collection.to_string(),
            key,
        })
    }

    fn stage(&self, write: Write) -> Result<()> {
        self.with_state(|state| {
            let staged = match &write {
                Write::Create { fields, .. } | Write::Update { fields, .. } => Some(fields.clone()),
                Write::Delete { .. } => None,
            };
            state.staged.insert(
                (write.collection().to_string(), write.key().clone()),
                staged,
            );
            state.writes.push(write);
        })
    }

    /// Commit the staged writes.
    ///
    /// Read-only transactions do not reach the store and report sequence 0.
    ///
    /// # Errors
    /// - `TransactionError::TransactionAlreadyCommitted` on a second call.
    /// - Any error from [`DocumentStore::commit`]; in that case nothing was applied.
    pub async fn commit(&self) -> Result<CommitReceipt> {
        let state = self
            .state
            .lock()
            .unwrap()
            .take()
            .ok_or(TransactionError::TransactionAlreadyCommitted)?;

        if state.writes.is_empty() {
            return Ok(CommitReceipt {
                sequence: 0,
                writes: 0,
            });
        }

        self.store.commit(state.reads, state.writes).await
    }
}
