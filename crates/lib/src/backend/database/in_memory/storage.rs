//! Core storage operations for the InMemory store

use std::collections::{BTreeMap, HashMap};

use super::{CollectionMap, InMemory, StoreState, StoredDocument};
use crate::{
    Result,
    backend::{CommitReceipt, DocKey, Document, Filter, ReadSet, Write, errors::BackendError},
};

fn to_document(key: &DocKey, stored: &StoredDocument) -> Document {
    Document {
        key: key.clone(),
        version: stored.version,
        fields: stored.fields.clone(),
    }
}

pub(crate) async fn get(backend: &InMemory, collection: &str, key: &DocKey) -> Option<Document> {
    let state = backend.state.read().await;
    state
        .collections
        .get(collection)
        .and_then(|docs| docs.get(key))
        .map(|stored| to_document(key, stored))
}

pub(crate) async fn query(backend: &InMemory, collection: &str, filter: &Filter) -> Vec<Document> {
    let state = backend.state.read().await;
    matching(&state, collection, filter)
        .map(|(key, stored)| to_document(key, stored))
        .collect()
}

fn matching<'a>(
    state: &'a StoreState,
    collection: &str,
    filter: &'a Filter,
) -> impl Iterator<Item = (&'a DocKey, &'a StoredDocument)> {
    state
        .collections
        .get(collection)
        .into_iter()
        .flat_map(|docs| docs.iter())
        .filter(move |(_, stored)| filter.matches(&stored.fields))
}

/// Validates the read set and applies all writes under the write lock.
///
/// Once the lock is held there are no await points, so a caller abandoning
/// the future can only do so before anything was checked or written.
pub(crate) async fn commit(
    backend: &InMemory,
    reads: ReadSet,
    writes: Vec<Write>,
) -> Result<CommitReceipt> {
    let mut state = backend.state.write().await;
    validate_reads(&state, &reads)?;
    let receipt = apply_writes(&mut state, writes)?;
    if receipt.writes > 0 {
        tracing::trace!(
            sequence = receipt.sequence,
            writes = receipt.writes,
            "Applied commit"
        );
    }
    Ok(receipt)
}

fn validate_reads(state: &StoreState, reads: &ReadSet) -> Result<()> {
    for (collection, key, observed) in reads.points() {
        let current = state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|stored| stored.version);
        if current != observed {
            return Err(BackendError::Conflict {
                collection: collection.to_string(),
                reason: format!("document {key} changed (read {observed:?}, now {current:?})"),
            }
            .into());
        }
    }

    for read in reads.queries() {
        let current: BTreeMap<DocKey, u64> = matching(state, &read.collection, &read.filter)
            .map(|(key, stored)| (key.clone(), stored.version))
            .collect();
        if current != read.observed {
            return Err(BackendError::Conflict {
                collection: read.collection.clone(),
                reason: format!(
                    "result of {:?} changed ({} documents read, {} now)",
                    read.filter,
                    read.observed.len(),
                    current.len()
                ),
            }
            .into());
        }
    }

    Ok(())
}

/// Applies writes to scratch copies of the touched collections and swaps them
/// in only when every write succeeded.
fn apply_writes(state: &mut StoreState, writes: Vec<Write>) -> Result<CommitReceipt> {
    if writes.is_empty() {
        return Ok(CommitReceipt {
            sequence: state.sequence,
            writes: 0,
        });
    }

    let sequence = state.sequence + 1;
    let count = writes.len();
    let mut touched: HashMap<String, CollectionMap> = HashMap::new();

    for write in writes {
        let docs = touched
            .entry(write.collection().to_string())
            .or_insert_with_key(|name| state.collections.get(name).cloned().unwrap_or_default());

        match write {
            Write::Create {
                collection,
                key,
                fields,
            } => {
                if docs.contains_key(&key) {
                    return Err(BackendError::AlreadyExists { collection, key }.into());
                }
                docs.insert(
                    key,
                    StoredDocument {
                        version: sequence,
                        fields,
                    },
                );
            }
            Write::Update {
                collection,
                key,
                fields,
            } => match docs.get_mut(&key) {
                Some(stored) => {
                    stored.version = sequence;
                    stored.fields = fields;
                }
                None => return Err(BackendError::DocumentNotFound { collection, key }.into()),
            },
            Write::Delete { collection, key } => {
                if docs.remove(&key).is_none() {
                    return Err(BackendError::DocumentNotFound { collection, key }.into());
                }
            }
        }
    }

    for (name, docs) in touched {
        if docs.is_empty() {
            state.collections.remove(&name);
        } else {
            state.collections.insert(name, docs);
        }
    }
    state.sequence = sequence;

    Ok(CommitReceipt {
        sequence,
        writes: count,
    })
}
