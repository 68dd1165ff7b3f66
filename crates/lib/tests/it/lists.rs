//! Handle operations beyond reordering: lookups, edits, fridge CRUD and
//! tenant scoping.

use larder::{
    CollectionId, ItemId, ItemPatch, NewFridgeItem, NewGroceryItem,
    item::ItemError,
    list::ListError,
};

use crate::helpers::*;

#[tokio::test]
async fn test_get_at_and_len() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs", "bread"]).await;

    assert_eq!(list.len().await.unwrap(), 3);
    assert!(!list.is_empty().await.unwrap());
    assert_eq!(list.get(&ItemId::Int(2)).await.unwrap().name, "eggs");
    assert_eq!(list.at(3).await.unwrap().unwrap().name, "bread");
    assert!(list.at(4).await.unwrap().is_none());
    assert!(list.get(&ItemId::Int(7)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_text_and_integer_identities_are_distinct() {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    list.push(item(7, "seven")).await.unwrap();
    list.push(NewGroceryItem::new("7", "text seven", 1).unwrap())
        .await
        .unwrap();

    assert_eq!(list.get(&ItemId::Int(7)).await.unwrap().name, "seven");
    assert_eq!(list.get(&ItemId::from("7")).await.unwrap().name, "text seven");

    list.delete(&ItemId::from("7")).await.unwrap();
    assert_eq!(names(&list).await, ["seven"]);
}

#[tokio::test]
async fn test_toggle_active_flips_and_keeps_position() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    let toggled = list.toggle_active(&ItemId::Int(2)).await.unwrap();
    assert!(toggled.active);
    assert_eq!(toggled.position, 2);

    let toggled = list.toggle_active(&ItemId::Int(2)).await.unwrap();
    assert!(!toggled.active);
    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_update_never_moves_the_item() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs", "bread"]).await;

    let patch = ItemPatch::default().name("oat milk").quantity(2).notes("barista");
    let updated = list.update(&ItemId::Int(1), &patch).await.unwrap();

    assert_eq!(updated.name, "oat milk");
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.notes, "barista");
    assert_eq!(updated.position, 1);
    assert_eq!(names(&list).await, ["oat milk", "eggs", "bread"]);
}

#[tokio::test]
async fn test_update_rejects_empty_and_invalid_patches() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk"]).await;

    let err = list
        .update(&ItemId::Int(1), &ItemPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, larder::Error::Item(ItemError::EmptyPatch)));

    let err = list
        .update(&ItemId::Int(1), &ItemPatch::default().quantity(0))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(list.get(&ItemId::Int(1)).await.unwrap().quantity, 1);
}

#[test]
fn test_item_validation() {
    assert!(matches!(
        NewGroceryItem::new(0_i64, "milk", 1),
        Err(ItemError::InvalidId { .. })
    ));
    assert!(matches!(
        NewGroceryItem::new("  ", "milk", 1),
        Err(ItemError::InvalidId { .. })
    ));
    assert!(matches!(
        NewGroceryItem::new(1_i64, "", 1),
        Err(ItemError::EmptyName)
    ));
    assert!(matches!(
        NewFridgeItem::new(1_i64, "milk", 0),
        Err(ItemError::InvalidQuantity { quantity: 0 })
    ));
}

#[tokio::test]
async fn test_verify_detects_corruption() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;
    list.verify().await.unwrap();

    // A third document claiming position 2 and nothing at 3
    raw_insert(&larder, "grocery", "stray", 9, 2).await;

    let err = list.verify().await.unwrap_err();
    assert!(err.is_integrity_error());
    match err {
        larder::Error::List(ListError::IndexCorrupted {
            len,
            missing,
            duplicates,
            ..
        }) => {
            assert_eq!(len, 3);
            assert_eq!(missing, [3]);
            assert_eq!(duplicates, [2]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fridge_crud() {
    let larder = test_larder();
    let fridge = larder.fridge("fridge");
    let clock = larder.clock();

    let added = fridge
        .add(NewFridgeItem::new("kale", "kale", 1).unwrap().with_notes("organic"))
        .await
        .unwrap();
    assert_eq!(added.added, clock.now());
    assert_eq!(added.notes, "organic");

    fridge
        .add(NewFridgeItem::new(3_i64, "butter", 2).unwrap())
        .await
        .unwrap();
    assert_eq!(fridge.list().await.unwrap().len(), 2);

    let updated = fridge
        .update(&ItemId::Int(3), &ItemPatch::default().quantity(1))
        .await
        .unwrap();
    assert_eq!(updated.quantity, 1);
    assert_eq!(updated.added, clock.now());

    let removed = fridge.delete(&ItemId::from("kale")).await.unwrap();
    assert_eq!(removed.name, "kale");
    assert!(fridge.get(&ItemId::from("kale")).await.unwrap_err().is_not_found());
    assert!(fridge.delete(&ItemId::from("kale")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_fridge_rejects_duplicate_identity() {
    let larder = test_larder();
    let fridge = larder.fridge("fridge");
    fridge
        .add(NewFridgeItem::new(1_i64, "milk", 1).unwrap())
        .await
        .unwrap();

    let err = fridge
        .add(NewFridgeItem::new(1_i64, "more milk", 1).unwrap())
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(fridge.get(&ItemId::Int(1)).await.unwrap().name, "milk");
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let larder = test_larder();
    let alice = larder.grocery_list(CollectionId::grocery(Some("alice")));
    let bob = larder.grocery_list(CollectionId::grocery(Some("bob")));
    assert_eq!(alice.collection().as_str(), "users/alice/grocery");

    alice.push(item(1, "milk")).await.unwrap();
    bob.push(item(1, "tea")).await.unwrap();
    bob.push(item(2, "honey")).await.unwrap();

    alice.delete(&ItemId::Int(1)).await.unwrap();

    assert!(alice.is_empty().await.unwrap());
    assert_eq!(names(&bob).await, ["tea", "honey"]);
    assert_dense(&larder, "users/bob/grocery").await;
}
