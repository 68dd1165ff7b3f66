//! Migration engine: moving the active subset of a grocery list into a fridge.
//!
//! Each active item is deleted from the ordered source and recreated in the
//! unordered destination under its identity, keeping every attribute field,
//! dropping `position` and `active` and gaining a fresh `added` timestamp.
//! The vacated positions are then handed to the compaction engine together
//! with the pre-migration size.
//!
//! Two modes are offered:
//!
//! * [`MigrationMode::Atomic`] does everything in one transaction. Any
//!   failure rolls the whole batch back.
//! * [`MigrationMode::PerItem`] moves each item in its own transaction,
//!   which also shifts the items above it down by one. The list is dense
//!   after every commit. A failure part way stops there and is reported as
//!   [`ListError::PartialMigration`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    Larder, Result,
    backend::{BackendError, Document, Filter},
    compaction::compact,
    reorder::close_gap,
    constants::{ACTIVE, ADDED, POSITION},
    index::{identity_of, position_of},
    item::{ItemId, Position},
    list::ListError,
    transaction::Transaction,
};

/// How a migration batch is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    /// One transaction for the whole batch
    #[default]
    Atomic,
    /// One transaction per item, each closing the gap it leaves
    PerItem,
}

/// What a completed migration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Identities moved, in source position order
    pub migrated: Vec<ItemId>,
    /// Source positions the moved items held when they left the list
    pub vacated: BTreeSet<Position>,
    /// Position rewrites applied to items left in the list
    pub renumbered: usize,
}

impl MigrationReport {
    pub fn count(&self) -> usize {
        self.migrated.len()
    }
}

/// Stage the move of one source document into `destination`.
async fn move_one(
    tx: &Transaction,
    source: &str,
    destination: &str,
    doc: &Document,
    item_id: &ItemId,
    added: DateTime<Utc>,
) -> Result<()> {
    let key = item_id.doc_key();
    if tx.get(destination, &key).await?.is_some() {
        return Err(BackendError::AlreadyExists {
            collection: destination.to_string(),
            key,
        }
        .into());
    }

    let mut fields = doc.fields.clone();
    fields.remove(POSITION);
    fields.remove(ACTIVE);
    fields.insert(ADDED.to_string(), json!(added));

    tx.delete(source, doc.key.clone())?;
    tx.create(destination, key, fields)
}

fn source_order(source: &str, docs: &[Document]) -> Result<Vec<(Position, Document)>> {
    let mut ordered = docs
        .iter()
        .map(|doc| Ok((position_of(source, doc)?, doc.clone())))
        .collect::<Result<Vec<_>>>()?;
    ordered.sort_by_key(|(position, _)| *position);
    Ok(ordered)
}

/// Move every active item of `source` into `destination` inside `tx`, then
/// compact `source`.
///
/// # Errors
/// - `BackendError::AlreadyExists` if the destination already holds one of
///   the identities; nothing is staged for commit in that case.
/// - `ListError::AmbiguousIdentity` if two active items share a position.
pub async fn migrate_active(
    tx: &Transaction,
    source: &str,
    destination: &str,
    added: DateTime<Utc>,
) -> Result<MigrationReport> {
    let docs = tx.query(source, &Filter::all()).await?;
    let len_before = docs.len();

    let ordered = source_order(source, &docs)?;
    let mut report = MigrationReport::default();
    for (position, doc) in &ordered {
        if doc.bool_field(ACTIVE) != Some(true) {
            continue;
        }
        let item_id = identity_of(source, doc)?;
        if !report.vacated.insert(*position) {
            return Err(ListError::AmbiguousIdentity {
                collection: source.to_string(),
                target: format!("{POSITION} {position}"),
                matches: ordered.iter().filter(|(p, _)| p == position).count(),
            }
            .into());
        }
        move_one(tx, source, destination, doc, &item_id, added).await?;
        report.migrated.push(item_id);
    }

    report.renumbered = compact(tx, source, &report.vacated, len_before).await?;
    debug!(
        source,
        destination,
        migrated = report.count(),
        renumbered = report.renumbered,
        "Planned migration"
    );
    Ok(report)
}

/// Item-by-item migration driven through `larder`'s retry policy.
///
/// Each item moves in its own transaction together with the shift that
/// closes its gap, so other callers only ever see a dense list and any
/// operation racing a step conflicts and retries. Every transaction gets
/// the configured deadline on its own. The first item that fails stops the
/// batch; what moved before it stays moved.
pub(crate) async fn migrate_active_per_item(
    larder: &Larder,
    source: &str,
    destination: &str,
) -> Result<MigrationReport> {
    let selected = larder
        .run("migrate.select", |tx| async move {
            let docs = tx.query(source, &Filter::all()).await?;
            let mut selected = Vec::new();
            for (_, doc) in source_order(source, &docs)? {
                if doc.bool_field(ACTIVE) == Some(true) {
                    let item_id = identity_of(source, &doc)?;
                    selected.push((doc.key, item_id));
                }
            }
            Ok(selected)
        })
        .await?;

    let mut report = MigrationReport::default();
    let mut remaining = selected.into_iter();

    while let Some((key, item_id)) = remaining.next() {
        let added = larder.clock().now();
        let outcome = larder
            .run("migrate.item", |tx| {
                let key = key.clone();
                let item_id = item_id.clone();
                async move {
                    // Re-read: the item may have moved or changed since selection
                    let Some(doc) = tx.get(source, &key).await? else {
                        return Ok(None);
                    };
                    if doc.bool_field(ACTIVE) != Some(true) {
                        return Ok(None);
                    }
                    let position = position_of(source, &doc)?;
                    move_one(&tx, source, destination, &doc, &item_id, added).await?;
                    let shifted = close_gap(&tx, source, position).await?;
                    Ok(Some((position, shifted)))
                }
            })
            .await;

        match outcome {
            Ok(Some((position, shifted))) => {
                report.vacated.insert(position);
                report.renumbered += shifted;
                report.migrated.push(item_id);
            }
            Ok(None) => debug!(source, %item_id, "Item no longer active, skipped"),
            Err(err) => {
                warn!(source, destination, %item_id, error = %err, "Failed to migrate item");
                let mut failed = vec![item_id];
                failed.extend(remaining.map(|(_, item_id)| item_id));
                return Err(ListError::PartialMigration {
                    source_collection: source.to_string(),
                    migrated: report.migrated,
                    failed,
                    reason: err.to_string(),
                }
                .into());
            }
        }
    }

    Ok(report)
}
