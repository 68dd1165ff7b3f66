//! Moving active items from a grocery list into the fridge.

use larder::{
    GroceryList, ItemId, Larder, MigrationMode, NewFridgeItem,
    backend::{DocKey, DocumentStore, Filter},
    constants::{ACTIVE, ADDED, ITEM_ID, POSITION},
    list::ListError,
};

use crate::helpers::*;

/// Five items, `b` and `d` active; `b` and `c` carry an opaque `aisle`.
async fn shopping_list(larder: &Larder) -> GroceryList {
    let list = larder.grocery_list("grocery");
    list.push(item(1, "a")).await.unwrap();
    list.push(item(2, "b").with_active(true).with_field("aisle", 4))
        .await
        .unwrap();
    list.push(item(3, "c").with_field("aisle", 7)).await.unwrap();
    list.push(item(4, "d").with_active(true)).await.unwrap();
    list.push(item(5, "e")).await.unwrap();
    list
}

#[tokio::test]
async fn test_atomic_migration_moves_active_items() {
    let larder = test_larder();
    let list = shopping_list(&larder).await;
    let fridge = larder.fridge("fridge");

    let report = list.migrate_active(&fridge).await.unwrap();

    assert_eq!(report.migrated, [ItemId::Int(2), ItemId::Int(4)]);
    assert_eq!(report.vacated.iter().copied().collect::<Vec<_>>(), [2, 4]);
    // c: 3 -> 2, e: 5 -> 3
    assert_eq!(report.renumbered, 2);

    assert_eq!(names(&list).await, ["a", "c", "e"]);
    assert_dense(&larder, "grocery").await;
    let c = list.get(&ItemId::Int(3)).await.unwrap();
    assert_eq!(c.position, 2);

    let moved = fridge.list().await.unwrap();
    assert_eq!(moved.len(), 2);
    assert!(moved.iter().all(|item| item.added == larder.clock().now()));
    assert_eq!(fridge.get(&ItemId::Int(2)).await.unwrap().name, "b");
}

#[tokio::test]
async fn test_migrated_documents_drop_ordering_fields() {
    let larder = test_larder();
    let list = shopping_list(&larder).await;
    let fridge = larder.fridge("fridge");
    list.migrate_active(&fridge).await.unwrap();

    let doc = larder
        .store()
        .get("fridge", &DocKey::from("2"))
        .await
        .unwrap()
        .unwrap();
    assert!(doc.field(POSITION).is_none());
    assert!(doc.field(ACTIVE).is_none());
    assert!(doc.field(ADDED).is_some());
    assert_eq!(doc.int_field("aisle"), Some(4));
}

#[tokio::test]
async fn test_survivors_keep_their_fields() {
    let larder = test_larder();
    let list = shopping_list(&larder).await;
    list.migrate_active(&larder.fridge("fridge")).await.unwrap();

    let survivors = list.list().await.unwrap();
    assert!(survivors.iter().all(|item| !item.active));

    let docs = larder
        .store()
        .query("grocery", &Filter::eq(ITEM_ID, 3))
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].int_field("aisle"), Some(7));
}

#[tokio::test]
async fn test_atomic_migration_rolls_back_on_existing_identity() {
    let larder = test_larder();
    let list = shopping_list(&larder).await;
    let fridge = larder.fridge("fridge");
    fridge
        .add(NewFridgeItem::new(4_i64, "old d", 1).unwrap())
        .await
        .unwrap();

    let err = list.migrate_active(&fridge).await.unwrap_err();
    assert!(err.is_already_exists());

    // Item 2 would have moved first; it must still be in the list
    assert_eq!(names(&list).await, ["a", "b", "c", "d", "e"]);
    assert_dense(&larder, "grocery").await;
    assert_eq!(fridge.list().await.unwrap().len(), 1);
    assert_eq!(fridge.get(&ItemId::Int(4)).await.unwrap().name, "old d");
}

#[tokio::test]
async fn test_migration_without_active_items_is_a_no_op() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["a", "b"]).await;
    let sequence = memory(&larder).sequence().await;

    let report = list.migrate_active(&larder.fridge("fridge")).await.unwrap();

    assert_eq!(report.count(), 0);
    assert_eq!(report.renumbered, 0);
    assert_eq!(memory(&larder).sequence().await, sequence);
    assert_eq!(names(&list).await, ["a", "b"]);
}

#[tokio::test]
async fn test_migrating_every_item_empties_the_list() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    for id in 1..=3 {
        list.push(item(id, &format!("item-{id}")).with_active(true))
            .await
            .unwrap();
    }
    let fridge = larder.fridge("fridge");

    let report = list.migrate_active(&fridge).await.unwrap();

    assert_eq!(report.count(), 3);
    assert!(list.is_empty().await.unwrap());
    assert_eq!(fridge.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_per_item_migration() {
    let larder = larder_with(test_config().with_migration_mode(MigrationMode::PerItem));
    let list = shopping_list(&larder).await;
    let fridge = larder.fridge("fridge");

    let report = list.migrate_active(&fridge).await.unwrap();

    assert_eq!(report.migrated, [ItemId::Int(2), ItemId::Int(4)]);
    // d left from 3 once b's gap was closed
    assert_eq!(report.vacated.iter().copied().collect::<Vec<_>>(), [2, 3]);
    // c, d, e shifted after b; e again after d
    assert_eq!(report.renumbered, 4);
    assert_eq!(names(&list).await, ["a", "c", "e"]);
    assert_dense(&larder, "grocery").await;
    assert_eq!(fridge.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_per_item_migration_reports_partial_progress() {
    let larder = larder_with(test_config().with_migration_mode(MigrationMode::PerItem));
    let list = shopping_list(&larder).await;
    let fridge = larder.fridge("fridge");
    memory(&larder).fail_writes_to("fridge", "4");

    let err = list.migrate_active(&fridge).await.unwrap_err();
    assert!(err.is_partial_migration());
    match err {
        larder::Error::List(ListError::PartialMigration {
            migrated, failed, ..
        }) => {
            assert_eq!(migrated, [ItemId::Int(2)]);
            assert_eq!(failed, [ItemId::Int(4)]);
        }
        other => panic!("unexpected error: {other}"),
    }

    // What moved is gone and its gap closed
    assert_eq!(names(&list).await, ["a", "c", "d", "e"]);
    assert_dense(&larder, "grocery").await;
    assert!(list.get(&ItemId::Int(4)).await.unwrap().active);
    assert_eq!(fridge.list().await.unwrap().len(), 1);

    // Once the store recovers a second checkout finishes the job
    memory(&larder).clear_faults();
    let report = list.migrate_active(&fridge).await.unwrap();
    assert_eq!(report.migrated, [ItemId::Int(4)]);
    assert_eq!(names(&list).await, ["a", "c", "e"]);
    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_shared_active_position_reports_every_match() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    list.push(item(1, "a")).await.unwrap();
    list.push(item(2, "b").with_active(true)).await.unwrap();
    raw_insert_active(&larder, "grocery", "x", 8, 2).await;
    raw_insert_active(&larder, "grocery", "y", 9, 2).await;

    let err = list.migrate_active(&larder.fridge("fridge")).await.unwrap_err();
    assert!(err.is_integrity_error());
    match err {
        larder::Error::List(ListError::AmbiguousIdentity { target, matches, .. }) => {
            assert_eq!(target, "position 2");
            assert_eq!(matches, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(larder.fridge("fridge").list().await.unwrap().is_empty());
}
