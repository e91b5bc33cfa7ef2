//! Case: batched saves and removes fail per element, not wholesale.
//!
//! Scenario:
//!
//! 1. Save a batch of three where the middle item names a collection that
//!    does not exist.
//! 2. Remove a batch where the middle id is foreign.
//! 3. Update an item under a detail mask.
//!
//! Expected Result:
//!
//! - Good elements persist and get their ids written back; the bad index
//!   alone appears in the error map and the overall error reflects it.
//! - The masked update touches only the masked categories.

use std::collections::BTreeSet;

use pimkit::CollectionId;
use pimkit::DetailKind;
use pimkit::ErrorKind;
use pimkit::ErrorMap;
use pimkit::FetchHint;
use pimkit::ItemFetchParams;
use pimkit::OrganizerManager;

use crate::common::at;
use crate::common::event;

#[tokio::test]
async fn test_batch_save_keeps_good_elements() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut bad = event("middle", at(2024, 4, 2, 9));
    bad.collection_id = Some(CollectionId::new("elsewhere", 7));
    let mut batch = [
        event("first", at(2024, 4, 1, 9)),
        bad,
        event("last", at(2024, 4, 3, 9)),
    ];

    assert!(!manager.save_items(&mut batch).await);
    assert_eq!(manager.error(), ErrorKind::InvalidCollection);
    assert_eq!(
        manager.error_map(),
        ErrorMap::from([(1, ErrorKind::InvalidCollection)]),
        "only the failed index is mapped"
    );

    assert!(batch[0].id.is_some());
    assert!(batch[1].id.is_none(), "the failed element is left untouched");
    assert!(batch[2].id.is_some());

    let stored = manager.items(ItemFetchParams::default()).await;
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_batch_remove_reports_per_element() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut batch = [
        event("first", at(2024, 4, 1, 9)),
        event("last", at(2024, 4, 3, 9)),
    ];
    assert!(manager.save_items(&mut batch).await);

    let ids = vec![
        batch[0].id.clone().expect("saved"),
        pimkit::ItemId::new("elsewhere", 9),
        batch[1].id.clone().expect("saved"),
    ];
    assert!(!manager.remove_items(&ids).await);
    assert_eq!(manager.error(), ErrorKind::DoesNotExist);
    assert_eq!(manager.error_map(), ErrorMap::from([(1, ErrorKind::DoesNotExist)]));

    assert!(
        manager.items(ItemFetchParams::default()).await.is_empty(),
        "the good elements are gone despite the failed one"
    );
}

#[tokio::test]
async fn test_masked_update_touches_only_masked_categories() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut item = event("review", at(2024, 4, 5, 15));
    item.description = Some("April numbers".to_string());
    assert!(manager.save_item(&mut item).await);
    let id = item.id.clone().expect("saved");

    item.display_label = Some("review, extended".to_string());
    item.description = Some("this text must not land".to_string());
    let mut batch = [item];
    assert!(
        manager
            .save_items_with_mask(&mut batch, BTreeSet::from([DetailKind::DisplayLabel]))
            .await
    );
    assert_eq!(
        batch[0].description.as_deref(),
        Some("April numbers"),
        "the write-back is the merged record"
    );

    let stored = manager.item(&id, FetchHint::unrestricted()).await.expect("still there");
    assert_eq!(stored.display_label.as_deref(), Some("review, extended"));
    assert_eq!(stored.description.as_deref(), Some("April numbers"));
}
