//! Case: results arrive as progressively larger full snapshots.
//!
//! Scenario:
//!
//! 1. Build a manager over a scripted engine that installs three result
//!    snapshots, pausing for an explicit go-ahead before each one.
//! 2. Start an item fetch request and release the snapshots one at a time.
//! 3. Read the request's results between releases.
//!
//! Expected Result:
//!
//! - Every read between releases sees exactly the last installed snapshot,
//!   never a partial one.
//! - Intermediate reads find the request still active.
//! - After the last snapshot the request finishes cleanly and its results
//!   stay readable, even once the manager is gone.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pimkit::ChangeEvent;
use pimkit::CollectionId;
use pimkit::DetailKind;
use pimkit::ErrorKind;
use pimkit::FilterKind;
use pimkit::Item;
use pimkit::ItemFetchRequest;
use pimkit::ItemKind;
use pimkit::ManagerBuilder;
use pimkit::OrganizerEngine;
use pimkit::RequestProxy;
use pimkit::RequestResults;
use pimkit::RequestState;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;

use crate::common::at;
use crate::common::event;
use crate::common::eventually;

/// Replays scripted result snapshots, waiting for one permit per stage.
struct StagedEngine {
    stages: Vec<Vec<Item>>,
    advance: Semaphore,
}

#[async_trait]
impl OrganizerEngine for StagedEngine {
    fn manager_name(&self) -> String {
        "staged".to_string()
    }

    async fn execute(&self, request: RequestProxy) {
        for stage in &self.stages {
            let permit = self.advance.acquire().await.expect("semaphore stays open");
            permit.forget();
            if !request.update_results(RequestResults::Items(stage.clone())) {
                return;
            }
        }
        request.finish(ErrorKind::NoError);
    }

    fn register_change_listener(&self, _listener: mpsc::UnboundedSender<ChangeEvent>) {}

    fn supported_filters(&self) -> Vec<FilterKind> {
        Vec::new()
    }

    fn supported_item_types(&self) -> Vec<ItemKind> {
        vec![ItemKind::Event]
    }

    fn supported_item_details(&self, _kind: ItemKind) -> Vec<DetailKind> {
        Vec::new()
    }

    fn default_collection_id(&self) -> CollectionId {
        CollectionId::new("staged", 0)
    }
}

#[tokio::test]
async fn test_results_grow_as_full_snapshots() {
    crate::enable_logger();

    let one = event("one", at(2024, 5, 1, 9));
    let two = event("two", at(2024, 5, 2, 9));
    let three = event("three", at(2024, 5, 3, 9));
    let engine = Arc::new(StagedEngine {
        stages: vec![
            vec![one.clone()],
            vec![one.clone(), two.clone()],
            vec![one, two, three],
        ],
        advance: Semaphore::new(0),
    });
    let manager = ManagerBuilder::new()
        .with_engine(engine.clone())
        .build()
        .expect("build inside runtime");

    let mut request = ItemFetchRequest::new();
    request.set_manager(&manager);
    request.start().expect("submission");

    engine.advance.add_permits(1);
    eventually("the first snapshot", || request.items().len() == 1).await;
    assert_eq!(request.state(), RequestState::Active);
    assert_eq!(request.items()[0].display_label.as_deref(), Some("one"));

    engine.advance.add_permits(1);
    eventually("the second snapshot", || request.items().len() == 2).await;
    assert_eq!(request.state(), RequestState::Active);
    let labels: Vec<Option<String>> = request
        .items()
        .iter()
        .map(|item| item.display_label.clone())
        .collect();
    assert_eq!(
        labels,
        [Some("one".to_string()), Some("two".to_string())],
        "a snapshot replaces the previous one, it never appends to it"
    );

    engine.advance.add_permits(1);
    assert!(request.wait_for_finished(Duration::from_secs(5)).await);
    assert_eq!(request.error(), ErrorKind::NoError);
    assert_eq!(request.items().len(), 3);

    drop(manager);
    assert_eq!(request.items().len(), 3, "results are owned by the request");
}
