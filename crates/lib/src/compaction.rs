//! Compaction engine: renumbering survivors after a batch of removals.
//!
//! Given the positions removed in one batch and the list size before the
//! batch, [`compute_remap`] walks `1..=len_before` in order, skips the removed
//! positions and hands out `1, 2, 3, ...` to the survivors. Relative order is
//! preserved and the result is dense.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use tracing::debug;

use crate::{
    Result,
    backend::{Document, Filter},
    constants::POSITION,
    index::position_of,
    item::Position,
    transaction::Transaction,
};

/// Old position to new position for every survivor of a batch removal.
///
/// ```
/// use std::collections::BTreeSet;
/// use larder::compaction::compute_remap;
///
/// let remap = compute_remap(&BTreeSet::from([2, 5]), 6);
/// let pairs: Vec<_> = remap.into_iter().collect();
/// assert_eq!(pairs, vec![(1, 1), (3, 2), (4, 3), (6, 4)]);
/// ```
pub fn compute_remap(removed: &BTreeSet<Position>, len_before: usize) -> BTreeMap<Position, Position> {
    let upper = Position::try_from(len_before).unwrap_or(Position::MAX);
    (1..=upper)
        .filter(|old| !removed.contains(old))
        .zip(1..)
        .collect()
}

/// Stage position rewrites for `survivors` according to `remap`.
///
/// Documents whose position is not a key of `remap`, or already sits at its
/// target, are left alone. Returns the number of documents rewritten.
pub fn apply_remap(
    tx: &Transaction,
    collection: &str,
    survivors: &[Document],
    remap: &BTreeMap<Position, Position>,
) -> Result<usize> {
    let mut rewritten = 0;
    for doc in survivors {
        let old = position_of(collection, doc)?;
        match remap.get(&old) {
            Some(&new) if new != old => {
                let mut fields = doc.fields.clone();
                fields.insert(POSITION.to_string(), json!(new));
                tx.update(collection, doc.key.clone(), fields)?;
                rewritten += 1;
            }
            _ => {}
        }
    }
    Ok(rewritten)
}

/// Renumber what is left of `collection` after `removed` positions were
/// vacated from a list of `len_before` items.
///
/// Runs against the transaction's view, so removals staged earlier in the
/// same transaction are already gone. An empty `removed` set is a no-op.
pub async fn compact(
    tx: &Transaction,
    collection: &str,
    removed: &BTreeSet<Position>,
    len_before: usize,
) -> Result<usize> {
    if removed.is_empty() {
        return Ok(0);
    }

    let remap = compute_remap(removed, len_before);
    debug!(collection, ?removed, len_before, ?remap, "Planned compaction");

    let survivors = tx.query(collection, &Filter::all()).await?;
    apply_remap(tx, collection, &survivors, &remap)
}
