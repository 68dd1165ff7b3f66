//! Logical collection handles.
//!
//! A [`CollectionId`] names the store collection a list lives in. Callers
//! pick the name; [`CollectionId::scoped`] builds the per-tenant path layout
//! (`users/{tenant}/{name}`) used when several users share one store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{FRIDGE, GROCERY, USERS};

/// Name of a collection in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `users/{tenant}/{name}`
    pub fn scoped(tenant: &str, name: &str) -> Self {
        Self(format!("{USERS}/{tenant}/{name}"))
    }

    /// The default ordered collection, optionally scoped to a tenant.
    pub fn grocery(tenant: Option<&str>) -> Self {
        match tenant {
            Some(tenant) => Self::scoped(tenant, GROCERY),
            None => Self::new(GROCERY),
        }
    }

    /// The default unordered collection, optionally scoped to a tenant.
    pub fn fridge(tenant: Option<&str>) -> Self {
        match tenant {
            Some(tenant) => Self::scoped(tenant, FRIDGE),
            None => Self::new(FRIDGE),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CollectionId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
