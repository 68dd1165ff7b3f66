//! Reorder engine: insert, delete and move on an ordered collection.
//!
//! Each operation is one contiguous [`ShiftPlan`] over neighbouring items
//! plus one direct write to the item being inserted, removed or moved. Every
//! document the plan touches, and the query that found them, belongs to the
//! same transaction, so the shift and the direct write commit together or not
//! at all.

use serde_json::json;
use tracing::debug;

use crate::{
    Result,
    backend::{DocKey, Document, Filter},
    constants::{ITEM_ID, POSITION},
    index::{self, position_of},
    item::{GroceryItem, ItemId, NewGroceryItem, Position},
    list::ListError,
    transaction::Transaction,
};

/// Add `delta` to every position in `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPlan {
    pub start: Position,
    pub end: Position,
    pub delta: i8,
}

impl ShiftPlan {
    /// Make room at `position` in a list of `len` items.
    pub fn for_insert(position: Position, len: usize) -> Option<Self> {
        let len = Position::try_from(len).ok()?;
        (position <= len).then_some(Self {
            start: position,
            end: len,
            delta: 1,
        })
    }

    /// Close the gap left at `removed` when the highest position is `max`.
    pub fn for_delete(removed: Position, max: Position) -> Option<Self> {
        (removed < max).then_some(Self {
            start: removed + 1,
            end: max,
            delta: -1,
        })
    }

    /// Shift the items between `from` and `to` toward `from`.
    ///
    /// Moving earlier pushes `[to, from - 1]` up by one, moving later pulls
    /// `[from + 1, to]` down by one. `None` when `from == to`.
    pub fn for_move(from: Position, to: Position) -> Option<Self> {
        match from.cmp(&to) {
            std::cmp::Ordering::Greater => Some(Self {
                start: to,
                end: from - 1,
                delta: 1,
            }),
            std::cmp::Ordering::Less => Some(Self {
                start: from + 1,
                end: to,
                delta: -1,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.start..=self.end).contains(&position)
    }

    /// Where `position` ends up; positions outside the plan stay put.
    pub fn apply(&self, position: Position) -> Position {
        if !self.contains(position) {
            return position;
        }
        position.saturating_add_signed(i32::from(self.delta))
    }

    /// Number of positions the plan rewrites.
    pub fn span(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}

/// Check an insert target lies in `1..=len + 1`.
pub fn validate_insert(collection: &str, position: Position, len: usize) -> Result<()> {
    if position == 0 || position as usize > len + 1 {
        return Err(ListError::InvalidPosition {
            collection: collection.to_string(),
            position,
            max: len + 1,
        }
        .into());
    }
    Ok(())
}

/// Check move endpoints lie in `1..=len` and differ.
pub fn validate_move(collection: &str, from: Position, to: Position, len: usize) -> Result<()> {
    let in_range = |p: Position| p >= 1 && p as usize <= len;
    if from == to || !in_range(from) || !in_range(to) {
        return Err(ListError::InvalidRange {
            collection: collection.to_string(),
            from,
            to,
            len,
        }
        .into());
    }
    Ok(())
}

/// Stage position rewrites for every document the plan covers, skipping `skip`.
fn stage_shift(
    tx: &Transaction,
    collection: &str,
    docs: &[Document],
    plan: ShiftPlan,
    skip: Option<&DocKey>,
) -> Result<usize> {
    let mut shifted = 0;
    for doc in docs {
        if skip == Some(&doc.key) {
            continue;
        }
        let position = position_of(collection, doc)?;
        if !plan.contains(position) {
            continue;
        }
        let mut fields = doc.fields.clone();
        fields.insert(POSITION.to_string(), json!(plan.apply(position)));
        tx.update(collection, doc.key.clone(), fields)?;
        shifted += 1;
    }
    Ok(shifted)
}

/// Insert `item` at `position`, shifting everything at or after it up by one.
///
/// # Errors
/// - `ListError::InvalidPosition` unless `1 <= position <= len + 1`.
/// - `ListError::DuplicateIdentity` if the identity is already in the list.
pub async fn insert(
    tx: &Transaction,
    collection: &str,
    item: NewGroceryItem,
    position: Position,
) -> Result<GroceryItem> {
    let docs = tx.query(collection, &Filter::all()).await?;
    validate_insert(collection, position, docs.len())?;

    let identity = item.item_id.to_value();
    if docs.iter().any(|doc| doc.field(ITEM_ID) == Some(&identity)) {
        return Err(ListError::DuplicateIdentity {
            collection: collection.to_string(),
            item_id: item.item_id,
        }
        .into());
    }

    let plan = ShiftPlan::for_insert(position, docs.len());
    debug!(collection, position, len = docs.len(), ?plan, "Planned insert");
    if let Some(plan) = plan {
        stage_shift(tx, collection, &docs, plan, None)?;
    }

    let created = Document {
        key: DocKey::generate(),
        version: 0,
        fields: item.into_fields(position),
    };
    let item = created.decode::<GroceryItem>()?;
    tx.create(collection, created.key, created.fields)?;
    Ok(item)
}

/// Insert `item` after the current last position.
pub async fn append(tx: &Transaction, collection: &str, item: NewGroceryItem) -> Result<GroceryItem> {
    let len = tx.query(collection, &Filter::all()).await?.len();
    let position = Position::try_from(len + 1).map_err(|_| ListError::InvalidPosition {
        collection: collection.to_string(),
        position: Position::MAX,
        max: len + 1,
    })?;
    insert(tx, collection, item, position).await
}

/// Shift every item above `removed` down by one.
///
/// The shift covers every position above the removed one up to the highest
/// position currently stored, however long the list is. The tail query is
/// part of `tx`, so an item appearing in the tail before commit is a
/// conflict. Returns the number of items shifted.
pub(crate) async fn close_gap(tx: &Transaction, collection: &str, removed: Position) -> Result<usize> {
    let tail = tx
        .query(collection, &Filter::at_least(POSITION, i64::from(removed) + 1))
        .await?;
    let max = tail
        .iter()
        .map(|doc| position_of(collection, doc))
        .try_fold(removed, |max, p| p.map(|p| max.max(p)))?;

    let plan = ShiftPlan::for_delete(removed, max);
    debug!(collection, removed, max, ?plan, "Planned gap close");
    match plan {
        Some(plan) => stage_shift(tx, collection, &tail, plan, None),
        None => Ok(0),
    }
}

/// Remove the item carrying `item_id` and close the gap it leaves.
pub async fn delete(
    tx: &Transaction,
    collection: &str,
    item_id: &ItemId,
) -> Result<GroceryItem> {
    let target = index::resolve_identity(tx, collection, item_id).await?;
    let removed = position_of(collection, &target)?;
    debug!(collection, %item_id, removed, "Deleting item");
    close_gap(tx, collection, removed).await?;

    let item = target.decode::<GroceryItem>()?;
    tx.delete(collection, target.key)?;
    Ok(item)
}

/// Move the item at `from` to `to`, shifting the items in between.
///
/// # Errors
/// - `ListError::InvalidRange` unless both ends are in `1..=len` and differ.
/// - `ListError::AmbiguousIdentity` if more than one item sits at `from`.
/// - `ListError::IndexCorrupted` if no item sits at `from`.
pub async fn move_item(
    tx: &Transaction,
    collection: &str,
    from: Position,
    to: Position,
) -> Result<GroceryItem> {
    let docs = tx.query(collection, &Filter::all()).await?;
    validate_move(collection, from, to, docs.len())?;

    let mut at_from = Vec::new();
    for doc in &docs {
        if position_of(collection, doc)? == from {
            at_from.push(doc);
        }
    }
    let moved = match at_from.as_slice() {
        [doc] => *doc,
        [] => {
            return Err(ListError::IndexCorrupted {
                collection: collection.to_string(),
                len: docs.len(),
                missing: vec![from],
                duplicates: Vec::new(),
            }
            .into());
        }
        many => {
            return Err(ListError::AmbiguousIdentity {
                collection: collection.to_string(),
                target: format!("{POSITION} {from}"),
                matches: many.len(),
            }
            .into());
        }
    };

    if let Some(plan) = ShiftPlan::for_move(from, to) {
        debug!(collection, from, to, ?plan, "Planned move");
        stage_shift(tx, collection, &docs, plan, Some(&moved.key))?;
    }

    let mut fields = moved.fields.clone();
    fields.insert(POSITION.to_string(), json!(to));
    let relocated = Document {
        key: moved.key.clone(),
        version: moved.version,
        fields,
    };
    let item = relocated.decode::<GroceryItem>()?;
    tx.update(collection, relocated.key, relocated.fields)?;
    Ok(item)
}
