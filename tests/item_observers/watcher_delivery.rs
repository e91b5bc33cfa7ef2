//! Case: per-item watchers hear exactly their item's changes, in order.
//!
//! Scenario:
//!
//! 1. Watch two saved items and update both in one batch; keep a third
//!    watcher on an untouched item.
//! 2. Update one item twice with different detail masks.
//! 3. Watch an exception record and remove its recurring parent.
//!
//! Expected Result:
//!
//! - Watchers of touched items fire once each; the third stays silent.
//! - Sequential changes reach the watcher in the order they happened, each
//!   naming its masked categories.
//! - The cascade removal of the exception reaches its watcher.

use std::collections::BTreeSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use pimkit::DetailKind;
use pimkit::ItemWatcher;
use pimkit::OrganizerManager;

use crate::common::at;
use crate::common::daily_event;
use crate::common::event;
use crate::common::eventually;
use crate::common::exception_of;

#[derive(Default)]
struct RecordingWatcher {
    changed: Mutex<Vec<Vec<DetailKind>>>,
    removed: AtomicUsize,
}

impl RecordingWatcher {
    fn changes(&self) -> usize {
        self.changed.lock().len()
    }
}

impl ItemWatcher for RecordingWatcher {
    fn item_changed(&self, details: &[DetailKind]) {
        self.changed.lock().push(details.to_vec());
    }

    fn item_removed(&self) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_watchers_fire_only_for_their_item() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut first = event("first", at(2024, 3, 1, 9));
    let mut second = event("second", at(2024, 3, 2, 9));
    let mut untouched = event("untouched", at(2024, 3, 3, 9));
    assert!(manager.save_item(&mut first).await);
    assert!(manager.save_item(&mut second).await);
    assert!(manager.save_item(&mut untouched).await);

    let on_first = Arc::new(RecordingWatcher::default());
    let on_second = Arc::new(RecordingWatcher::default());
    let on_untouched = Arc::new(RecordingWatcher::default());
    let _a = manager.observe_item(first.id.clone().expect("saved"), on_first.clone());
    let _b = manager.observe_item(second.id.clone().expect("saved"), on_second.clone());
    let _c = manager.observe_item(untouched.id.clone().expect("saved"), on_untouched.clone());

    first.display_label = Some("first, renamed".to_string());
    second.display_label = Some("second, renamed".to_string());
    let mut batch = [first, second];
    assert!(
        manager
            .save_items_with_mask(&mut batch, BTreeSet::from([DetailKind::DisplayLabel]))
            .await
    );

    eventually("both watchers", || {
        on_first.changes() == 1 && on_second.changes() == 1
    })
    .await;
    assert_eq!(on_untouched.changes(), 0);
    assert_eq!(on_untouched.removed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_changes_arrive_in_order_with_their_masks() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut item = event("planning", at(2024, 3, 4, 10));
    assert!(manager.save_item(&mut item).await);

    let watcher = Arc::new(RecordingWatcher::default());
    let _observer = manager.observe_item(item.id.clone().expect("saved"), watcher.clone());

    item.display_label = Some("planning, renamed".to_string());
    let mut batch = [item.clone()];
    assert!(
        manager
            .save_items_with_mask(&mut batch, BTreeSet::from([DetailKind::DisplayLabel]))
            .await
    );
    item.description = Some("quarterly".to_string());
    let mut batch = [item];
    assert!(
        manager
            .save_items_with_mask(&mut batch, BTreeSet::from([DetailKind::Description]))
            .await
    );

    eventually("both changes", || watcher.changes() == 2).await;
    assert_eq!(
        *watcher.changed.lock(),
        vec![vec![DetailKind::DisplayLabel], vec![DetailKind::Description]],
        "delivery follows change order and names the masked categories"
    );
}

#[tokio::test]
async fn test_cascade_removal_reaches_the_exception_watcher() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut series = daily_event("standup", at(2024, 3, 1, 9));
    assert!(manager.save_item(&mut series).await);
    let mut moved = exception_of(&series, at(2024, 3, 2, 9), at(2024, 3, 2, 14));
    assert!(manager.save_item(&mut moved).await);

    let watcher = Arc::new(RecordingWatcher::default());
    let _observer = manager.observe_item(moved.id.clone().expect("saved"), watcher.clone());

    assert!(manager.remove_item(&series.id.expect("saved")).await);
    eventually("the cascade removal", || {
        watcher.removed.load(Ordering::SeqCst) == 1
    })
    .await;
    assert_eq!(watcher.changes(), 0);
}
