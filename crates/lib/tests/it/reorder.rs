//! Insert, delete and move through the `GroceryList` handle.

use larder::{ItemId, list::ListError};

use crate::helpers::*;

#[tokio::test]
async fn test_insert_at_front_middle_and_end() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    list.insert(item(10, "bread"), 1).await.unwrap();
    assert_eq!(names(&list).await, ["bread", "milk", "eggs"]);

    list.insert(item(11, "jam"), 3).await.unwrap();
    assert_eq!(names(&list).await, ["bread", "milk", "jam", "eggs"]);

    let appended = list.insert(item(12, "tea"), 5).await.unwrap();
    assert_eq!(appended.position, 5);
    assert_eq!(names(&list).await, ["bread", "milk", "jam", "eggs", "tea"]);

    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_insert_into_empty_list() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");

    let created = list.insert(item(1, "milk"), 1).await.unwrap();
    assert_eq!(created.position, 1);
    assert_eq!(list.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_rejects_out_of_range_positions() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    for position in [0, 4, 100] {
        let err = list.insert(item(9, "bread"), position).await.unwrap_err();
        assert!(err.is_invalid_input(), "position {position}: {err}");
        assert!(matches!(
            err,
            larder::Error::List(ListError::InvalidPosition { max: 3, .. })
        ));
    }

    assert_eq!(names(&list).await, ["milk", "eggs"]);
    assert_eq!(memory(&larder).document_count("grocery").await, 2);
}

#[tokio::test]
async fn test_insert_rejects_duplicate_identity() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    let err = list.insert(item(2, "more eggs"), 1).await.unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(names(&list).await, ["milk", "eggs"]);
}

#[tokio::test]
async fn test_delete_closes_the_gap() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c", "d", "e"]).await;

    let removed = list.delete(&ItemId::Int(2)).await.unwrap();
    assert_eq!(removed.name, "b");
    assert_eq!(removed.position, 2);
    assert_eq!(names(&list).await, ["a", "c", "d", "e"]);
    assert_dense(&larder, "grocery").await;

    // Last and first
    list.delete(&ItemId::Int(5)).await.unwrap();
    list.delete(&ItemId::Int(1)).await.unwrap();
    assert_eq!(names(&list).await, ["c", "d"]);
    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_delete_every_item() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c"]).await;

    for id in [2, 1, 3] {
        list.delete(&ItemId::Int(id)).await.unwrap();
        assert_dense(&larder, "grocery").await;
    }
    assert!(list.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_delete_in_long_list_shifts_whole_tail() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    for id in 1..=120 {
        list.push(item(id, &format!("item-{id}"))).await.unwrap();
    }

    list.delete(&ItemId::Int(3)).await.unwrap();

    assert_dense(&larder, "grocery").await;
    let last = list.get(&ItemId::Int(120)).await.unwrap();
    assert_eq!(last.position, 119);
    assert_eq!(list.at(3).await.unwrap().unwrap().item_id, ItemId::Int(4));
}

#[tokio::test]
async fn test_delete_missing_identity() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk"]).await;

    let err = list.delete(&ItemId::Int(42)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(names(&list).await, ["milk"]);
}

#[tokio::test]
async fn test_delete_ambiguous_identity_changes_nothing() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;
    raw_insert(&larder, "grocery", "dup-a", 9, 3).await;
    raw_insert(&larder, "grocery", "dup-b", 9, 4).await;

    let err = list.delete(&ItemId::Int(9)).await.unwrap_err();
    assert!(err.is_integrity_error());
    assert!(matches!(
        err,
        larder::Error::List(ListError::AmbiguousIdentity { matches: 2, .. })
    ));
    assert_eq!(memory(&larder).document_count("grocery").await, 4);
    assert_eq!(stored_positions(&larder, "grocery").await, [1, 2, 3, 4]);
}

#[tokio::test]
async fn test_move_later_and_earlier() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c", "d", "e"]).await;

    let moved = list.move_item(2, 4).await.unwrap();
    assert_eq!(moved.name, "b");
    assert_eq!(moved.position, 4);
    assert_eq!(names(&list).await, ["a", "c", "d", "b", "e"]);
    assert_dense(&larder, "grocery").await;

    list.move_item(5, 1).await.unwrap();
    assert_eq!(names(&list).await, ["e", "a", "c", "d", "b"]);
    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_move_there_and_back_restores_order() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c", "d"]).await;
    let before = ids(&list).await;

    list.move_item(1, 4).await.unwrap();
    list.move_item(4, 1).await.unwrap();

    assert_eq!(ids(&list).await, before);
}

#[tokio::test]
async fn test_move_adjacent_swaps() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c"]).await;

    list.move_item(2, 3).await.unwrap();
    assert_eq!(names(&list).await, ["a", "c", "b"]);
}

#[tokio::test]
async fn test_move_rejects_bad_ranges() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b", "c"]).await;

    for (from, to) in [(2, 2), (0, 1), (1, 4), (4, 1)] {
        let err = list.move_item(from, to).await.unwrap_err();
        assert!(err.is_invalid_input(), "{from} -> {to}: {err}");
        assert!(matches!(
            err,
            larder::Error::List(ListError::InvalidRange { len: 3, .. })
        ));
    }
    assert_eq!(names(&list).await, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_move_from_empty_slot_reports_corruption() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    raw_insert(&larder, "grocery", "x", 1, 1).await;
    raw_insert(&larder, "grocery", "y", 2, 3).await;

    let err = list.move_item(2, 1).await.unwrap_err();
    assert!(err.is_integrity_error());
    assert_eq!(stored_positions(&larder, "grocery").await, [1, 3]);
}
