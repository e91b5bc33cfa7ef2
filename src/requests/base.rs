use std::fmt;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::RequestParams;
use super::RequestProxy;
use super::RequestResults;
use crate::manager::ManagerShared;
use crate::ErrorKind;
use crate::ErrorMap;
use crate::RequestError;

/// Lifecycle state of an asynchronous request.
///
/// Transitions are monotonic: a request never returns to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Constructed, not yet submitted
    Inactive,
    /// Submitted; an engine is executing it out-of-line
    Active,
    /// Cancellation requested while active; the engine may still finish with
    /// partial results
    Cancelling,
    /// Terminal; results and error are final
    Finished,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Inactive => "inactive",
            RequestState::Active => "active",
            RequestState::Cancelling => "cancelling",
            RequestState::Finished => "finished",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which operation a request performs. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ItemFetch,
    ItemIdFetch,
    ItemFetchForExport,
    ItemOccurrenceFetch,
    ItemSave,
    ItemRemove,
    CollectionFetch,
    CollectionSave,
    CollectionRemove,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ItemFetch => "item_fetch",
            OperationKind::ItemIdFetch => "item_id_fetch",
            OperationKind::ItemFetchForExport => "item_fetch_for_export",
            OperationKind::ItemOccurrenceFetch => "item_occurrence_fetch",
            OperationKind::ItemSave => "item_save",
            OperationKind::ItemRemove => "item_remove",
            OperationKind::CollectionFetch => "collection_fetch",
            OperationKind::CollectionSave => "collection_save",
            OperationKind::CollectionRemove => "collection_remove",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a request shares between the submitting thread and the engine.
///
/// Guarded as one block by the core's mutex: readers see each field pre- or
/// post-write, never torn.
pub(crate) struct RequestInner {
    pub state: RequestState,
    pub error: ErrorKind,
    pub error_map: ErrorMap,
    pub params: RequestParams,
    pub results: RequestResults,
    /// Non-owning manager binding, revalidated on every use
    pub manager: Option<Weak<ManagerShared>>,
}

/// Shared heart of every request type.
///
/// The submitting side owns an `Arc` of this through its typed wrapper; the
/// engine side holds only a [`RequestProxy`] with a `Weak`, so a client
/// dropping the request mid-flight leaves the engine with dead (inert)
/// handles rather than dangling state.
pub(crate) struct RequestCore {
    kind: OperationKind,
    inner: Mutex<RequestInner>,
    /// Broadcasts state transitions to waiters
    state_tx: watch::Sender<RequestState>,
    cancel_token: CancellationToken,
}

impl RequestCore {
    pub(crate) fn new(kind: OperationKind, params: RequestParams) -> Arc<Self> {
        let (state_tx, _) = watch::channel(RequestState::Inactive);
        Arc::new(Self {
            kind,
            inner: Mutex::new(RequestInner {
                state: RequestState::Inactive,
                error: ErrorKind::NoError,
                error_map: ErrorMap::new(),
                params,
                results: RequestResults::empty_for(kind),
                manager: None,
            }),
            state_tx,
            cancel_token: CancellationToken::new(),
        })
    }

    pub(crate) fn kind(&self) -> OperationKind {
        self.kind
    }

    pub(crate) fn state(&self) -> RequestState {
        self.inner.lock().state
    }

    pub(crate) fn error(&self) -> ErrorKind {
        self.inner.lock().error
    }

    pub(crate) fn error_map(&self) -> ErrorMap {
        self.inner.lock().error_map.clone()
    }

    /// Runs `f` with the inner block locked. Never call anything blocking
    /// from `f`.
    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut RequestInner) -> R) -> R {
        let mut inner = self.inner.lock();
        f(&mut inner)
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub(crate) fn bind_manager(&self, manager: Weak<ManagerShared>) {
        self.inner.lock().manager = Some(manager);
    }

    /// Test-only shortcut that flips the request to `Active` without going
    /// through a manager.
    #[cfg(test)]
    pub(crate) fn force_active(&self) {
        let mut inner = self.inner.lock();
        inner.state = RequestState::Active;
        self.state_tx.send_replace(RequestState::Active);
    }

    /// Moves the request from `Inactive` to `Active` and hands it to the
    /// bound manager's engine. Execution is out-of-line; this never blocks on
    /// engine progress.
    pub(crate) fn start(self: &Arc<Self>) -> std::result::Result<(), RequestError> {
        let shared = {
            let mut inner = self.inner.lock();
            let shared = inner
                .manager
                .as_ref()
                .and_then(Weak::upgrade)
                .ok_or(RequestError::NotPermitted)?;
            if inner.state != RequestState::Inactive {
                return Err(RequestError::AlreadyStarted {
                    state: inner.state.as_str(),
                });
            }
            inner.state = RequestState::Active;
            self.state_tx.send_replace(RequestState::Active);
            shared
        };
        debug!(request = %self.kind, "request submitted");
        shared.submit(RequestProxy::new(self));
        Ok(())
    }

    /// Requests cooperative cancellation.
    ///
    /// From `Inactive` there is nothing to cancel: the request finishes
    /// immediately with empty results and no error. From `Active` the engine
    /// is signalled and may still finish with partial results. `Cancelling`
    /// and `Finished` are no-ops.
    pub(crate) fn cancel(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            RequestState::Inactive => {
                inner.state = RequestState::Finished;
                inner.error = ErrorKind::NoError;
                inner.results = RequestResults::empty_for(self.kind);
                self.state_tx.send_replace(RequestState::Finished);
                drop(inner);
                debug!(request = %self.kind, "unstarted request cancelled");
            }
            RequestState::Active => {
                inner.state = RequestState::Cancelling;
                self.state_tx.send_replace(RequestState::Cancelling);
                drop(inner);
                self.cancel_token.cancel();
                debug!(request = %self.kind, "cancellation requested");
            }
            RequestState::Cancelling | RequestState::Finished => {}
        }
    }

    /// Waits until the request is terminal or `timeout` elapses. Returns
    /// whether it finished. Safe to call from any task or thread.
    pub(crate) async fn wait_for_finished(&self, timeout: Duration) -> bool {
        let mut rx = self.state_tx.subscribe();
        // Bound to a local so the state borrow ends before `rx` goes away.
        let finished =
            match tokio::time::timeout(timeout, rx.wait_for(|state| state.is_terminal())).await {
                Ok(Ok(_)) => true,
                // The sender lives in self, so this arm only types out the API.
                Ok(Err(_)) => self.state().is_terminal(),
                Err(_) => false,
            };
        finished
    }

    /// Replaces the result snapshot. Engine-side; accepted only while the
    /// request is running. Each call installs a fully-formed snapshot.
    pub(crate) fn update_results(&self, results: RequestResults) -> bool {
        let mut inner = self.inner.lock();
        if !matches!(inner.state, RequestState::Active | RequestState::Cancelling) {
            return false;
        }
        inner.results = results;
        true
    }

    /// Replaces the per-element error map. Engine-side, running requests only.
    pub(crate) fn update_error_map(&self, error_map: ErrorMap) -> bool {
        let mut inner = self.inner.lock();
        if !matches!(inner.state, RequestState::Active | RequestState::Cancelling) {
            return false;
        }
        inner.error_map = error_map;
        true
    }

    /// Drives the request to `Finished` with the given terminal error,
    /// keeping whatever result snapshot is current. Engine-side.
    pub(crate) fn finish(&self, error: ErrorKind) -> bool {
        let mut inner = self.inner.lock();
        if !matches!(inner.state, RequestState::Active | RequestState::Cancelling) {
            return false;
        }
        inner.state = RequestState::Finished;
        inner.error = error;
        self.state_tx.send_replace(RequestState::Finished);
        drop(inner);
        debug!(request = %self.kind, error = %error, "request finished");
        true
    }

    /// Called when the owning wrapper is dropped. A request abandoned while
    /// running signals cancellation so the engine can wind down; its proxy
    /// handles go inert either way.
    pub(crate) fn abandon(&self) {
        let inner = self.inner.lock();
        if matches!(inner.state, RequestState::Active | RequestState::Cancelling) {
            drop(inner);
            self.cancel_token.cancel();
            trace!(request = %self.kind, "request dropped while running");
        }
    }
}
