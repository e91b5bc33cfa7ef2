//! Case: occurrence expansion over date windows and caps.
//!
//! Scenario:
//!
//! 1. Persist a daily series and ask for occurrences under various windows.
//! 2. Reschedule one instance through an exception record.
//! 3. Ask with a negative cap against an engine configured with a small
//!    expansion limit.
//!
//! Expected Result:
//!
//! - A bounded window yields exactly the instances inside it; an absent
//!   start bound reaches back to the series start.
//! - The rescheduled instance shows up at its new time and its generated
//!   slot is not produced a second time.
//! - A negative cap defers to the engine's limit, a non-negative cap binds.

use std::sync::Arc;

use pimkit::ItemKind;
use pimkit::ItemOccurrenceFetchParams;
use pimkit::ManagerBuilder;
use pimkit::MemOrganizerEngine;
use pimkit::OrganizerManager;

use crate::common::at;
use crate::common::daily_event;
use crate::common::event;
use crate::common::exception_of;

#[tokio::test]
async fn test_daily_series_expands_inside_the_window() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut series = daily_event("standup", at(2024, 1, 1, 9));
    assert!(manager.save_item(&mut series).await);

    let occurrences = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(series.clone()),
            start: Some(at(2024, 1, 3, 0)),
            end: Some(at(2024, 1, 5, 23)),
            ..Default::default()
        })
        .await;

    let starts: Vec<_> = occurrences.iter().filter_map(|occ| occ.start_time()).collect();
    assert_eq!(
        starts,
        [at(2024, 1, 3, 9), at(2024, 1, 4, 9), at(2024, 1, 5, 9)]
    );
    for occ in &occurrences {
        assert_eq!(occ.kind, ItemKind::EventOccurrence);
        assert!(occ.id.is_none(), "generated instances are transient");
        assert_eq!(
            occ.parent.as_ref().map(|link| &link.parent_id),
            series.id.as_ref()
        );
    }
}

#[tokio::test]
async fn test_open_start_reaches_back_to_the_series_start() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut series = daily_event("standup", at(2024, 1, 1, 9));
    assert!(manager.save_item(&mut series).await);

    let occurrences = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(series),
            end: Some(at(2024, 1, 4, 23)),
            ..Default::default()
        })
        .await;

    let starts: Vec<_> = occurrences.iter().filter_map(|occ| occ.start_time()).collect();
    assert_eq!(
        starts,
        [
            at(2024, 1, 1, 9),
            at(2024, 1, 2, 9),
            at(2024, 1, 3, 9),
            at(2024, 1, 4, 9),
        ]
    );
}

#[tokio::test]
async fn test_rescheduled_instance_replaces_its_slot() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut series = daily_event("standup", at(2024, 1, 1, 9));
    assert!(manager.save_item(&mut series).await);
    let mut moved = exception_of(&series, at(2024, 1, 2, 9), at(2024, 1, 2, 14));
    assert!(manager.save_item(&mut moved).await);

    let occurrences = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(series),
            start: Some(at(2024, 1, 1, 0)),
            end: Some(at(2024, 1, 3, 23)),
            ..Default::default()
        })
        .await;

    let starts: Vec<_> = occurrences.iter().filter_map(|occ| occ.start_time()).collect();
    assert_eq!(
        starts,
        [at(2024, 1, 1, 9), at(2024, 1, 2, 14), at(2024, 1, 3, 9)],
        "the generated slot for the moved instance must not reappear"
    );
    assert_eq!(occurrences[1].id, moved.id, "the exception comes back as saved");
}

#[tokio::test]
async fn test_negative_cap_defers_to_the_engine() {
    crate::enable_logger();

    let manager = ManagerBuilder::new()
        .with_engine(Arc::new(MemOrganizerEngine::with_expansion_cap(5)))
        .build()
        .expect("build inside runtime");
    let mut series = daily_event("standup", at(2024, 1, 1, 9));
    assert!(manager.save_item(&mut series).await);

    let unbounded = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(series.clone()),
            ..Default::default()
        })
        .await;
    assert_eq!(unbounded.len(), 5, "the engine's own limit applies");

    let capped = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(series),
            max_occurrences: 3,
            ..Default::default()
        })
        .await;
    let starts: Vec<_> = capped.iter().filter_map(|occ| occ.start_time()).collect();
    assert_eq!(
        starts,
        [at(2024, 1, 1, 9), at(2024, 1, 2, 9), at(2024, 1, 3, 9)],
        "a non-negative cap keeps the earliest instances"
    );
}

#[tokio::test]
async fn test_non_recurring_item_is_its_own_occurrence() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut single = event("dentist", at(2024, 1, 10, 11));
    assert!(manager.save_item(&mut single).await);

    let occurrences = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(single.clone()),
            ..Default::default()
        })
        .await;
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].id, single.id);

    let outside = manager
        .item_occurrences(ItemOccurrenceFetchParams {
            parent: Some(single),
            start: Some(at(2024, 2, 1, 0)),
            ..Default::default()
        })
        .await;
    assert!(outside.is_empty());
}
