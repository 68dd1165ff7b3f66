//! Outage handling and deadlines seen through the list handles.

use std::time::Duration;

use larder::{ItemId, backend::database::InjectedFault, retry::RetryPolicy};

use crate::helpers::*;

#[tokio::test]
async fn test_transient_outage_is_retried() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    memory(&larder).fail_next_commits(2, InjectedFault::Unavailable);
    list.insert(item(3, "bread"), 2).await.unwrap();

    assert_eq!(names(&list).await, ["milk", "bread", "eggs"]);
    assert_dense(&larder, "grocery").await;
}

#[tokio::test]
async fn test_persistent_outage_surfaces_and_writes_nothing() {
    let larder = test_larder();
    let list = seeded_list(&larder, &["milk", "eggs"]).await;
    let sequence = memory(&larder).sequence().await;

    // One more failure than the policy retries
    let attempts = larder.config().retry.max_unavailable_retries as usize + 1;
    memory(&larder).fail_next_commits(attempts, InjectedFault::Unavailable);

    let err = list.delete(&ItemId::Int(1)).await.unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(err.is_retryable());

    assert_eq!(memory(&larder).sequence().await, sequence);
    assert_eq!(names(&list).await, ["milk", "eggs"]);
}

#[tokio::test]
async fn test_exhausted_conflict_retries_surface_conflict() {
    let retry = RetryPolicy {
        max_conflict_retries: 2,
        ..fast_retry()
    };
    let larder = larder_with(test_config().with_retry(retry));
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    memory(&larder).fail_next_commits(3, InjectedFault::Conflict);
    let err = list.move_item(1, 2).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(names(&list).await, ["milk", "eggs"]);
}

#[tokio::test]
async fn test_deadline_abandons_the_operation() {
    let config = test_config().with_deadline(Some(Duration::from_millis(50)));
    let larder = larder_with(config);
    let list = seeded_list(&larder, &["milk", "eggs"]).await;

    // Nobody else arrives at the gate, so the commit never proceeds
    memory(&larder).hold_commits(2);
    let err = list.insert(item(3, "bread"), 1).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(!err.is_retryable());

    memory(&larder).clear_faults();
    assert_eq!(names(&list).await, ["milk", "eggs"]);
    assert_dense(&larder, "grocery").await;

    // The next operation runs normally
    list.insert(item(3, "bread"), 1).await.unwrap();
    assert_eq!(names(&list).await, ["bread", "milk", "eggs"]);
}
