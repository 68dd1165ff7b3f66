//! Caller-facing list handles.
//!
//! [`GroceryList`] wraps an ordered collection and [`Fridge`] an unordered
//! one. Both are cheap to clone and obtained from a [`Larder`]. Every method
//! runs as one retried transaction under the larder's configured deadline.

pub mod errors;

use tracing::{info, instrument};

pub use errors::ListError;

use crate::{
    Larder, Result,
    backend::{BackendError, Document, Filter},
    collection::CollectionId,
    constants::ACTIVE,
    index,
    item::{FridgeItem, GroceryItem, ItemId, ItemPatch, NewFridgeItem, NewGroceryItem, Position},
    migration::{self, MigrationMode, MigrationReport},
    reorder,
};

/// An ordered collection with dense 1-based positions.
#[derive(Debug, Clone)]
pub struct GroceryList {
    larder: Larder,
    collection: CollectionId,
}

impl GroceryList {
    pub(crate) fn new(larder: Larder, collection: CollectionId) -> Self {
        Self { larder, collection }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    /// Insert `item` at `position`, shifting later items down the list.
    ///
    /// `position` may be anything in `1..=len + 1`; `len + 1` appends.
    #[instrument(skip(self, item), fields(collection = %self.collection, item_id = %item.item_id))]
    pub async fn insert(&self, item: NewGroceryItem, position: Position) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        let created = self
            .larder
            .run("insert", |tx| {
                let item = item.clone();
                async move { reorder::insert(&tx, collection, item, position).await }
            })
            .await?;
        info!(position = created.position, "Inserted item");
        Ok(created)
    }

    /// Append `item` after the last position.
    #[instrument(skip(self, item), fields(collection = %self.collection, item_id = %item.item_id))]
    pub async fn push(&self, item: NewGroceryItem) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        let created = self
            .larder
            .run("push", |tx| {
                let item = item.clone();
                async move { reorder::append(&tx, collection, item).await }
            })
            .await?;
        info!(position = created.position, "Appended item");
        Ok(created)
    }

    /// Remove the item with `item_id`, closing the gap it leaves.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, item_id: &ItemId) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        let removed = self
            .larder
            .run("delete", |tx| async move {
                reorder::delete(&tx, collection, item_id).await
            })
            .await?;
        info!(position = removed.position, "Deleted item");
        Ok(removed)
    }

    /// Move the item at `from` to `to`. Returns the moved item.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn move_item(&self, from: Position, to: Position) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        let moved = self
            .larder
            .run("move", |tx| async move {
                reorder::move_item(&tx, collection, from, to).await
            })
            .await?;
        info!(item_id = %moved.item_id, "Moved item");
        Ok(moved)
    }

    /// Move every active item into `fridge` and compact what remains.
    ///
    /// Uses the larder's configured [`MigrationMode`].
    #[instrument(skip(self, fridge), fields(source = %self.collection, destination = %fridge.collection))]
    pub async fn migrate_active(&self, fridge: &Fridge) -> Result<MigrationReport> {
        let source = self.collection.as_str();
        let destination = fridge.collection.as_str();
        let report = match self.larder.config().migration_mode {
            MigrationMode::Atomic => {
                let added = self.larder.clock().now();
                self.larder
                    .run("migrate", |tx| async move {
                        migration::migrate_active(&tx, source, destination, added).await
                    })
                    .await?
            }
            MigrationMode::PerItem => {
                migration::migrate_active_per_item(&self.larder, source, destination).await?
            }
        };
        info!(
            migrated = report.count(),
            renumbered = report.renumbered,
            "Migrated active items"
        );
        Ok(report)
    }

    /// Every item, ordered by position.
    pub async fn list(&self) -> Result<Vec<GroceryItem>> {
        let collection = self.collection.as_str();
        self.larder
            .run("list", |tx| async move {
                index::ordered(&tx, collection)
                    .await?
                    .into_iter()
                    .map(|(_, doc)| doc.decode::<GroceryItem>())
                    .collect::<Result<Vec<_>>>()
            })
            .await
    }

    /// The item with `item_id`.
    pub async fn get(&self, item_id: &ItemId) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        self.larder
            .run("get", |tx| async move {
                index::resolve_identity(&tx, collection, item_id)
                    .await?
                    .decode::<GroceryItem>()
            })
            .await
    }

    /// The item at `position`, if any.
    pub async fn at(&self, position: Position) -> Result<Option<GroceryItem>> {
        let collection = self.collection.as_str();
        self.larder
            .run("at", |tx| async move {
                index::resolve_position(&tx, collection, position)
                    .await?
                    .map(|doc| doc.decode::<GroceryItem>())
                    .transpose()
            })
            .await
    }

    pub async fn len(&self) -> Result<usize> {
        let collection = self.collection.as_str();
        self.larder
            .run("len", |tx| async move {
                Ok(tx.query(collection, &Filter::all()).await?.len())
            })
            .await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Flip the `active` flag of `item_id`.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn toggle_active(&self, item_id: &ItemId) -> Result<GroceryItem> {
        let collection = self.collection.as_str();
        let toggled = self
            .larder
            .run("toggle_active", |tx| async move {
                let doc = index::resolve_identity(&tx, collection, item_id).await?;
                let active = doc.bool_field(ACTIVE).unwrap_or(false);
                let mut fields = doc.fields;
                fields.insert(ACTIVE.to_string(), (!active).into());
                let updated = Document {
                    key: doc.key,
                    version: doc.version,
                    fields,
                };
                let item = updated.decode::<GroceryItem>()?;
                tx.update(collection, updated.key, updated.fields)?;
                Ok(item)
            })
            .await?;
        info!(active = toggled.active, "Toggled item");
        Ok(toggled)
    }

    /// Apply `patch` to `item_id`. Never changes the item's position.
    #[instrument(skip(self, patch), fields(collection = %self.collection))]
    pub async fn update(&self, item_id: &ItemId, patch: &ItemPatch) -> Result<GroceryItem> {
        patch.validate()?;
        let collection = self.collection.as_str();
        let updated = self
            .larder
            .run("update", |tx| async move {
                let doc = index::resolve_identity(&tx, collection, item_id).await?;
                let mut fields = doc.fields;
                patch.apply(&mut fields);
                let updated = Document {
                    key: doc.key,
                    version: doc.version,
                    fields,
                };
                let item = updated.decode::<GroceryItem>()?;
                tx.update(collection, updated.key, updated.fields)?;
                Ok(item)
            })
            .await?;
        info!("Updated item");
        Ok(updated)
    }

    /// Check that positions are exactly `1..=len`.
    ///
    /// # Errors
    /// `ListError::IndexCorrupted` naming the missing and duplicated positions.
    pub async fn verify(&self) -> Result<()> {
        let collection = self.collection.as_str();
        self.larder
            .run("verify", |tx| async move {
                index::check_dense(&tx, collection).await.map(|_| ())
            })
            .await
    }
}

/// An unordered collection keyed by item identity.
#[derive(Debug, Clone)]
pub struct Fridge {
    larder: Larder,
    collection: CollectionId,
}

impl Fridge {
    pub(crate) fn new(larder: Larder, collection: CollectionId) -> Self {
        Self { larder, collection }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    fn not_found(&self, item_id: &ItemId) -> crate::Error {
        ListError::NotFound {
            collection: self.collection.to_string(),
            item_id: item_id.clone(),
        }
        .into()
    }

    /// Add `item`, stamped with the larder clock.
    ///
    /// # Errors
    /// `BackendError::AlreadyExists` if the identity is already in the fridge.
    #[instrument(skip(self, item), fields(collection = %self.collection, item_id = %item.item_id))]
    pub async fn add(&self, item: NewFridgeItem) -> Result<FridgeItem> {
        let collection = self.collection.as_str();
        let added = self.larder.clock().now();
        let created = self
            .larder
            .run("fridge.add", |tx| {
                let item = item.clone();
                async move {
                    let key = item.item_id.doc_key();
                    if tx.get(collection, &key).await?.is_some() {
                        return Err(BackendError::AlreadyExists {
                            collection: collection.to_string(),
                            key,
                        }
                        .into());
                    }
                    let doc = Document {
                        key,
                        version: 0,
                        fields: item.into_fields(added),
                    };
                    let created = doc.decode::<FridgeItem>()?;
                    tx.create(collection, doc.key, doc.fields)?;
                    Ok(created)
                }
            })
            .await?;
        info!("Added item to fridge");
        Ok(created)
    }

    /// Every item, oldest first.
    pub async fn list(&self) -> Result<Vec<FridgeItem>> {
        let collection = self.collection.as_str();
        let mut items = self
            .larder
            .run("fridge.list", |tx| async move {
                tx.query(collection, &Filter::all())
                    .await?
                    .iter()
                    .map(|doc| doc.decode::<FridgeItem>())
                    .collect::<Result<Vec<_>>>()
            })
            .await?;
        items.sort_by(|a, b| a.added.cmp(&b.added).then_with(|| a.item_id.cmp(&b.item_id)));
        Ok(items)
    }

    pub async fn get(&self, item_id: &ItemId) -> Result<FridgeItem> {
        let collection = self.collection.as_str();
        let doc = self
            .larder
            .run("fridge.get", |tx| async move {
                tx.get(collection, &item_id.doc_key()).await
            })
            .await?;
        doc.ok_or_else(|| self.not_found(item_id))?.decode()
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, item_id: &ItemId) -> Result<FridgeItem> {
        let collection = self.collection.as_str();
        let removed = self
            .larder
            .run("fridge.delete", |tx| async move {
                let key = item_id.doc_key();
                let Some(doc) = tx.get(collection, &key).await? else {
                    return Ok(None);
                };
                let item = doc.decode::<FridgeItem>()?;
                tx.delete(collection, key)?;
                Ok(Some(item))
            })
            .await?
            .ok_or_else(|| self.not_found(item_id))?;
        info!("Removed item from fridge");
        Ok(removed)
    }

    #[instrument(skip(self, patch), fields(collection = %self.collection))]
    pub async fn update(&self, item_id: &ItemId, patch: &ItemPatch) -> Result<FridgeItem> {
        patch.validate()?;
        let collection = self.collection.as_str();
        let updated = self
            .larder
            .run("fridge.update", |tx| async move {
                let key = item_id.doc_key();
                let Some(doc) = tx.get(collection, &key).await? else {
                    return Ok(None);
                };
                let mut fields = doc.fields;
                patch.apply(&mut fields);
                let updated = Document {
                    key,
                    version: doc.version,
                    fields,
                };
                let item = updated.decode::<FridgeItem>()?;
                tx.update(collection, updated.key, updated.fields)?;
                Ok(Some(item))
            })
            .await?
            .ok_or_else(|| self.not_found(item_id))?;
        info!("Updated fridge item");
        Ok(updated)
    }
}
