//! Position index helpers.
//!
//! The position index is not stored anywhere on its own: it is the set of
//! `position` fields across the documents of an ordered collection. These
//! helpers read it back through a [`Transaction`], so every lookup is part of
//! the read set the commit validates.

use std::collections::BTreeMap;

use crate::{
    Result,
    backend::{BackendError, Document, Filter},
    constants::{ITEM_ID, POSITION},
    item::{ItemId, Position},
    list::ListError,
    transaction::Transaction,
};

/// Read the position of an ordered-collection document.
pub fn position_of(collection: &str, doc: &Document) -> Result<Position> {
    doc.int_field(POSITION)
        .and_then(|p| Position::try_from(p).ok())
        .filter(|p| *p >= 1)
        .ok_or_else(|| {
            BackendError::MalformedDocument {
                collection: collection.to_string(),
                key: doc.key.clone(),
                reason: format!("'{POSITION}' is missing or not a positive integer"),
            }
            .into()
        })
}

/// Read the identity of an item document.
pub fn identity_of(collection: &str, doc: &Document) -> Result<ItemId> {
    doc.field(ITEM_ID)
        .and_then(ItemId::from_value)
        .ok_or_else(|| {
            BackendError::MalformedDocument {
                collection: collection.to_string(),
                key: doc.key.clone(),
                reason: format!("'{ITEM_ID}' is missing or not an integer or string"),
            }
            .into()
        })
}

/// Find the single document carrying `item_id`.
///
/// # Errors
/// - `ListError::NotFound` if no document matches.
/// - `ListError::AmbiguousIdentity` if more than one does; nothing picks a
///   winner.
pub async fn resolve_identity(
    tx: &Transaction,
    collection: &str,
    item_id: &ItemId,
) -> Result<Document> {
    let mut docs = tx
        .query(collection, &Filter::eq(ITEM_ID, item_id.to_value()))
        .await?;
    if docs.len() > 1 {
        return Err(ListError::AmbiguousIdentity {
            collection: collection.to_string(),
            target: format!("{ITEM_ID} {item_id}"),
            matches: docs.len(),
        }
        .into());
    }
    docs.pop().ok_or_else(|| {
        ListError::NotFound {
            collection: collection.to_string(),
            item_id: item_id.clone(),
        }
        .into()
    })
}

/// Find the document at `position`, `None` if the slot is empty.
pub async fn resolve_position(
    tx: &Transaction,
    collection: &str,
    position: Position,
) -> Result<Option<Document>> {
    let mut docs = tx
        .query(collection, &Filter::eq(POSITION, position))
        .await?;
    if docs.len() > 1 {
        return Err(ListError::AmbiguousIdentity {
            collection: collection.to_string(),
            target: format!("{POSITION} {position}"),
            matches: docs.len(),
        }
        .into());
    }
    Ok(docs.pop())
}

/// Every document in the collection, sorted by position.
pub async fn ordered(tx: &Transaction, collection: &str) -> Result<Vec<(Position, Document)>> {
    let docs = tx.query(collection, &Filter::all()).await?;
    let mut ordered = docs
        .into_iter()
        .map(|doc| Ok((position_of(collection, &doc)?, doc)))
        .collect::<Result<Vec<_>>>()?;
    ordered.sort_by(|(a, da), (b, db)| a.cmp(b).then_with(|| da.key.cmp(&db.key)));
    Ok(ordered)
}

/// Outcome of checking a set of positions against `1..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DensityReport {
    pub len: usize,
    /// Positions in `1..=len` nobody holds
    pub missing: Vec<Position>,
    /// Positions held by more than one item
    pub duplicates: Vec<Position>,
    /// Positions outside `1..=len`
    pub out_of_range: Vec<Position>,
}

impl DensityReport {
    pub fn is_dense(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.out_of_range.is_empty()
    }
}

/// Compare a collection's positions against the dense sequence `1..=N`.
pub fn verify_dense(positions: impl IntoIterator<Item = Position>) -> DensityReport {
    let mut counts: BTreeMap<Position, usize> = BTreeMap::new();
    let mut len = 0;
    for position in positions {
        *counts.entry(position).or_default() += 1;
        len += 1;
    }

    let upper = Position::try_from(len).unwrap_or(Position::MAX);
    DensityReport {
        len,
        missing: (1..=upper).filter(|p| !counts.contains_key(p)).collect(),
        duplicates: counts
            .iter()
            .filter(|(_, n)| **n > 1)
            .map(|(p, _)| *p)
            .collect(),
        out_of_range: counts
            .keys()
            .filter(|p| **p == 0 || **p > upper)
            .copied()
            .collect(),
    }
}

/// Fail with `IndexCorrupted` unless the collection's positions are dense.
pub async fn check_dense(tx: &Transaction, collection: &str) -> Result<DensityReport> {
    let positions = ordered(tx, collection)
        .await?
        .into_iter()
        .map(|(position, _)| position);
    let report = verify_dense(positions);
    if report.is_dense() {
        Ok(report)
    } else {
        Err(ListError::IndexCorrupted {
            collection: collection.to_string(),
            len: report.len,
            missing: report.missing,
            duplicates: report.duplicates,
        }
        .into())
    }
}
