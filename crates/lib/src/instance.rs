//! The `Larder` handle.
//!
//! A [`Larder`] ties a document store to a clock and a configuration, and
//! hands out [`GroceryList`] and [`Fridge`] handles over named collections.

use std::future::Future;
use std::sync::Arc;

use crate::{
    Result,
    backend::DocumentStore,
    clock::{Clock, SystemClock},
    collection::CollectionId,
    config::LarderConfig,
    list::{Fridge, GroceryList},
    retry,
    transaction::Transaction,
};

/// Internal state for Larder
struct LarderInternal {
    store: Arc<dyn DocumentStore>,
    /// Source of fridge `added` timestamps
    clock: Arc<dyn Clock>,
    config: LarderConfig,
}

impl std::fmt::Debug for LarderInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LarderInternal")
            .field("store", &"<DocumentStore>")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish()
    }
}

/// Entry point to the positional-index engine.
///
/// `Larder` is a cheap-to-clone handle around shared state; list handles keep
/// a clone of it.
///
/// ## Example
///
/// ```
/// # use larder::{backend::database::InMemory, Larder, NewGroceryItem, ItemId};
/// # #[tokio::main]
/// # async fn main() -> larder::Result<()> {
/// let larder = Larder::open(Box::new(InMemory::new()));
/// let list = larder.grocery_list("grocery");
///
/// list.push(NewGroceryItem::new(1_i64, "milk", 1)?).await?;
/// list.insert(NewGroceryItem::new(2_i64, "bread", 1)?, 1).await?;
///
/// let names: Vec<_> = list.list().await?.into_iter().map(|i| i.name).collect();
/// assert_eq!(names, ["bread", "milk"]);
///
/// list.delete(&ItemId::Int(2)).await?;
/// assert_eq!(list.get(&ItemId::Int(1)).await?.position, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Larder {
    inner: Arc<LarderInternal>,
}

impl Larder {
    /// Open a larder over `store` with the default configuration.
    pub fn open(store: Box<dyn DocumentStore>) -> Self {
        Self::open_with_config(store, LarderConfig::default())
    }

    pub fn open_with_config(store: Box<dyn DocumentStore>, config: LarderConfig) -> Self {
        Self::open_impl(store, config, Arc::new(SystemClock))
    }

    /// Same as [`Larder::open_with_config`] with an injected clock.
    ///
    /// Only available with the `testing` feature or in test builds.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(
        store: Box<dyn DocumentStore>,
        config: LarderConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::open_impl(store, config, clock)
    }

    fn open_impl(store: Box<dyn DocumentStore>, config: LarderConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(LarderInternal {
                store: Arc::from(store),
                clock,
                config,
            }),
        }
    }

    /// The underlying store. Downcast through `as_any` to reach a concrete
    /// implementation, e.g. to save an `InMemory` store to disk.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn config(&self) -> &LarderConfig {
        &self.inner.config
    }

    /// Handle to the ordered collection `collection`.
    pub fn grocery_list(&self, collection: impl Into<CollectionId>) -> GroceryList {
        GroceryList::new(self.clone(), collection.into())
    }

    /// Handle to the unordered collection `collection`.
    pub fn fridge(&self, collection: impl Into<CollectionId>) -> Fridge {
        Fridge::new(self.clone(), collection.into())
    }

    /// Run `op` as a retried transaction under the configured policy and deadline.
    pub(crate) async fn run<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        retry::run(
            &self.inner.store,
            &self.inner.config.retry,
            self.inner.config.deadline,
            operation,
            op,
        )
        .await
    }
}
