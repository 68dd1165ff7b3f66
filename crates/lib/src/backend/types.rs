//! Data types exchanged with a [`DocumentStore`](super::DocumentStore).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;
use crate::backend::errors::BackendError;

/// Field map of a schemaless document.
pub type Fields = serde_json::Map<String, Value>;

/// Key of a document within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocKey(String);

impl DocKey {
    /// Wrap an existing key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh random key, as the store does for auto-id creates.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for DocKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A stored document as observed at a particular version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub key: DocKey,
    /// Commit sequence number of the last write to this document.
    ///
    /// Documents staged inside an uncommitted transaction report version 0.
    pub version: u64,
    pub fields: Fields,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Read an integer field, `None` if absent or not an integer.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    /// Read a boolean field, `None` if absent or not a boolean.
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    /// Deserialize the field map into a typed view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|source| BackendError::DeserializationFailed { source }.into())
    }
}

/// Predicate selecting documents within a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Documents whose `field` equals `value`.
    Eq { field: String, value: Value },
    /// Documents whose integer `field` lies in `[min, max]`; a missing bound is open.
    Range {
        field: String,
        min: Option<i64>,
        max: Option<i64>,
    },
}

impl Filter {
    pub fn all() -> Self {
        Filter::All
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field >= min` with no upper bound.
    pub fn at_least(field: impl Into<String>, min: i64) -> Self {
        Filter::Range {
            field: field.into(),
            min: Some(min),
            max: None,
        }
    }

    /// `min <= field <= max`.
    pub fn between(field: impl Into<String>, min: i64, max: i64) -> Self {
        Filter::Range {
            field: field.into(),
            min: Some(min),
            max: Some(max),
        }
    }

    /// Evaluate the predicate against a field map.
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => fields.get(field) == Some(value),
            Filter::Range { field, min, max } => {
                let Some(n) = fields.get(field).and_then(Value::as_i64) else {
                    return false;
                };
                min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
            }
        }
    }
}

/// A single mutation staged by a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create a document; fails if the key is taken.
    Create {
        collection: String,
        key: DocKey,
        fields: Fields,
    },
    /// Replace the fields of an existing document.
    Update {
        collection: String,
        key: DocKey,
        fields: Fields,
    },
    /// Remove an existing document.
    Delete { collection: String, key: DocKey },
}

impl Write {
    pub fn collection(&self) -> &str {
        match self {
            Write::Create { collection, .. }
            | Write::Update { collection, .. }
            | Write::Delete { collection, .. } => collection,
        }
    }

    pub fn key(&self) -> &DocKey {
        match self {
            Write::Create { key, .. } | Write::Update { key, .. } | Write::Delete { key, .. } => {
                key
            }
        }
    }
}

/// A query executed inside a transaction and the result it observed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRead {
    pub collection: String,
    pub filter: Filter,
    /// Key to version of every document the query returned.
    pub observed: BTreeMap<DocKey, u64>,
}

/// Everything a transaction read, so the store can verify at commit time that
/// none of it changed.
///
/// Point reads pin a single document (or its absence). Query reads pin the
/// full result set of a filter, which also catches documents that started or
/// stopped matching since the read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadSet {
    points: BTreeMap<(String, DocKey), Option<u64>>,
    queries: Vec<QueryRead>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a point read; `version` is `None` when the document was absent.
    ///
    /// The first observation of a key wins, later reads of the same key
    /// inside one transaction cannot see a different committed version.
    pub fn record_point(&mut self, collection: &str, key: &DocKey, version: Option<u64>) {
        self.points
            .entry((collection.to_string(), key.clone()))
            .or_insert(version);
    }

    pub fn record_query(&mut self, collection: &str, filter: &Filter, docs: &[Document]) {
        self.queries.push(QueryRead {
            collection: collection.to_string(),
            filter: filter.clone(),
            observed: docs.iter().map(|d| (d.key.clone(), d.version)).collect(),
        });
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, &DocKey, Option<u64>)> {
        self.points
            .iter()
            .map(|((collection, key), version)| (collection.as_str(), key, *version))
    }

    pub fn queries(&self) -> &[QueryRead] {
        &self.queries
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.queries.is_empty()
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Commit sequence number assigned to every document written.
    pub sequence: u64,
    /// Number of writes applied.
    pub writes: usize,
}
