//! Case: lifecycle states advance one way and stick at finished.
//!
//! Scenario:
//!
//! 1. Run an item fetch against a live in-memory store to completion.
//! 2. Poke the finished request with cancel and a second start.
//! 3. Cancel a bound request that was never started.
//!
//! Expected Result:
//!
//! - A fresh request is inactive with empty results and a clean error.
//! - Waiting again on a finished request returns immediately.
//! - Neither cancel nor start moves a finished request; the resubmission is
//!   rejected naming the finished state.
//! - Cancelling before start finishes the request cleanly without ever
//!   reaching the engine.

use std::time::Duration;

use pimkit::Error;
use pimkit::ErrorKind;
use pimkit::ItemFetchRequest;
use pimkit::OrganizerManager;
use pimkit::RequestError;
use pimkit::RequestState;

use crate::common::at;
use crate::common::event;

#[tokio::test]
async fn test_fetch_runs_to_finished_and_stays_there() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut seed = event("standup", at(2024, 5, 1, 9));
    assert!(manager.save_item(&mut seed).await);

    let mut request = ItemFetchRequest::new();
    assert_eq!(request.state(), RequestState::Inactive);
    assert!(request.items().is_empty());
    assert_eq!(request.error(), ErrorKind::NoError);

    request.set_manager(&manager);
    request.start().expect("submission");
    assert!(request.wait_for_finished(Duration::from_secs(5)).await);
    assert_eq!(request.state(), RequestState::Finished);
    assert_eq!(request.error(), ErrorKind::NoError);
    assert_eq!(request.items().len(), 1);

    // Terminal state is sticky.
    assert!(request.wait_for_finished(Duration::from_millis(1)).await);
    request.cancel();
    assert_eq!(request.state(), RequestState::Finished);
    match request.start() {
        Err(Error::Request(RequestError::AlreadyStarted { state })) => {
            assert_eq!(state, "finished")
        }
        other => panic!("expected AlreadyStarted, got {other:?}"),
    }
    assert_eq!(request.items().len(), 1, "results survive the rejected restart");
}

#[tokio::test]
async fn test_cancel_before_start_skips_the_engine() {
    crate::enable_logger();

    let manager = OrganizerManager::new().expect("build inside runtime");
    let mut request = ItemFetchRequest::new();
    request.set_manager(&manager);

    request.cancel();
    assert_eq!(request.state(), RequestState::Finished);
    assert_eq!(request.error(), ErrorKind::NoError);
    assert!(request.items().is_empty());

    match request.start() {
        Err(Error::Request(RequestError::AlreadyStarted { state })) => {
            assert_eq!(state, "finished")
        }
        other => panic!("expected AlreadyStarted, got {other:?}"),
    }
}
