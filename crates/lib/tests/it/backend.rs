//! InMemory store: commit validation and JSON persistence.

use larder::backend::{
    DocKey, DocumentStore, Fields, Filter, ReadSet, Write, database::InMemory,
};
use serde_json::json;

fn doc(position: i64) -> Fields {
    let mut fields = Fields::new();
    fields.insert("position".to_string(), json!(position));
    fields
}

fn create(collection: &str, key: &str, position: i64) -> Write {
    Write::Create {
        collection: collection.to_string(),
        key: DocKey::from(key),
        fields: doc(position),
    }
}

#[tokio::test]
async fn test_commit_applies_all_writes_atomically() {
    let store = InMemory::new();
    let receipt = store
        .commit(
            ReadSet::new(),
            vec![create("g", "a", 1), create("g", "b", 2)],
        )
        .await
        .unwrap();
    assert_eq!(receipt.writes, 2);
    assert_eq!(store.document_count("g").await, 2);

    // Second write collides, so the first must not land either
    let err = store
        .commit(
            ReadSet::new(),
            vec![create("g", "c", 3), create("g", "a", 1)],
        )
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(store.document_count("g").await, 2);
    assert!(store.get("g", &DocKey::from("c")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_versions_advance_with_each_write() {
    let store = InMemory::new();
    store
        .commit(ReadSet::new(), vec![create("g", "a", 1)])
        .await
        .unwrap();
    let first = store.get("g", &DocKey::from("a")).await.unwrap().unwrap();

    store
        .commit(
            ReadSet::new(),
            vec![Write::Update {
                collection: "g".to_string(),
                key: DocKey::from("a"),
                fields: doc(2),
            }],
        )
        .await
        .unwrap();
    let second = store.get("g", &DocKey::from("a")).await.unwrap().unwrap();

    assert!(second.version > first.version);
    assert_eq!(second.int_field("position"), Some(2));
}

#[tokio::test]
async fn test_range_query_is_inclusive() {
    let store = InMemory::new();
    store
        .commit(
            ReadSet::new(),
            (1..=5).map(|p| create("g", &format!("k{p}"), p)).collect(),
        )
        .await
        .unwrap();

    let middle = store
        .query("g", &Filter::between("position", 2, 4))
        .await
        .unwrap();
    assert_eq!(middle.len(), 3);

    let tail = store
        .query("g", &Filter::at_least("position", 4))
        .await
        .unwrap();
    assert_eq!(tail.len(), 2);
}

#[tokio::test]
async fn test_stale_query_read_conflicts() {
    let store = InMemory::new();
    store
        .commit(ReadSet::new(), vec![create("g", "a", 1)])
        .await
        .unwrap();

    let filter = Filter::at_least("position", 1);
    let seen = store.query("g", &filter).await.unwrap();
    let mut reads = ReadSet::new();
    reads.record_query("g", &filter, &seen);

    // A new document starts matching the filter
    store
        .commit(ReadSet::new(), vec![create("g", "b", 2)])
        .await
        .unwrap();

    let err = store
        .commit(reads, vec![create("g", "c", 3)])
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(err.is_retryable());
    assert_eq!(store.document_count("g").await, 2);
}

#[tokio::test]
async fn test_collections_lists_non_empty_names() {
    let store = InMemory::new();
    store
        .commit(
            ReadSet::new(),
            vec![create("grocery", "a", 1), create("fridge", "b", 1)],
        )
        .await
        .unwrap();
    store
        .commit(
            ReadSet::new(),
            vec![Write::Delete {
                collection: "fridge".to_string(),
                key: DocKey::from("b"),
            }],
        )
        .await
        .unwrap();

    assert_eq!(store.collections().await.unwrap(), vec!["grocery".to_string()]);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("larder.json");

    let store = InMemory::new();
    store
        .commit(
            ReadSet::new(),
            vec![create("grocery", "a", 1), create("grocery", "b", 2)],
        )
        .await
        .unwrap();
    store.save_to_file(&path).await.unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.sequence().await, store.sequence().await);
    let original = store.query("grocery", &Filter::all()).await.unwrap();
    let restored = loaded.query("grocery", &Filter::all()).await.unwrap();
    assert_eq!(original, restored);
}

#[tokio::test]
async fn test_load_missing_file_gives_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(store.sequence().await, 0);
    assert!(store.collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_rejects_unknown_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("larder.json");
    tokio::fs::write(&path, r#"{"_v": 9, "sequence": 0, "collections": {}}"#)
        .await
        .unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}
