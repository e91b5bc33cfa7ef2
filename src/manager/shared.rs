use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::watch;

use crate::config::OrganizerConfig;
use crate::observer::WatcherRegistry;
use crate::ChangeEvent;
use crate::ErrorKind;
use crate::ErrorMap;
use crate::OrganizerEngine;
use crate::RequestProxy;

/// Outcome of the most recent manager operation.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorReport {
    pub error: ErrorKind,
    pub error_map: ErrorMap,
}

/// State shared between a manager, its requests, its observers and its
/// dispatch task.
///
/// Only the [`OrganizerManager`](crate::OrganizerManager) owns this; requests
/// and observers hold it weakly and revalidate on every use, so nothing they
/// do can keep a closed manager alive.
pub(crate) struct ManagerShared {
    pub engine: Arc<dyn OrganizerEngine>,
    pub config: OrganizerConfig,
    /// Single last-error slot, overwritten by every operation
    last_error: ArcSwap<ErrorReport>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>,
    registry: WatcherRegistry,
    shutdown_tx: watch::Sender<()>,
    runtime: Handle,
}

impl ManagerShared {
    pub(crate) fn new(
        engine: Arc<dyn OrganizerEngine>,
        config: OrganizerConfig,
        shutdown_tx: watch::Sender<()>,
        runtime: Handle,
    ) -> Self {
        Self {
            engine,
            config,
            last_error: ArcSwap::from_pointee(ErrorReport::default()),
            listeners: Mutex::new(Vec::new()),
            registry: WatcherRegistry::new(),
            shutdown_tx,
            runtime,
        }
    }

    /// Hands an activated request to the engine on its own task.
    pub(crate) fn submit(&self, request: RequestProxy) {
        let engine = Arc::clone(&self.engine);
        self.runtime.spawn(async move {
            engine.execute(request).await;
        });
    }

    /// Fans one change event out to listener channels and item watchers.
    /// Runs on the manager's dispatch task only, which keeps per-watcher
    /// delivery in arrival order.
    pub(crate) fn dispatch(&self, event: ChangeEvent) {
        {
            let mut listeners = self.listeners.lock();
            listeners.retain(|tx| tx.send(event.clone()).is_ok());
        }
        match &event {
            ChangeEvent::ItemsChanged { ids, details } => {
                self.registry.dispatch_changed(ids, details)
            }
            ChangeEvent::ItemsRemoved(ids) => self.registry.dispatch_removed(ids),
            _ => {}
        }
    }

    pub(crate) fn add_listener(&self, listener: mpsc::UnboundedSender<ChangeEvent>) {
        self.listeners.lock().push(listener);
    }

    pub(crate) fn registry(&self) -> &WatcherRegistry {
        &self.registry
    }

    pub(crate) fn record_error(&self, error: ErrorKind, error_map: ErrorMap) {
        self.last_error.store(Arc::new(ErrorReport { error, error_map }));
    }

    pub(crate) fn error(&self) -> ErrorKind {
        self.last_error.load().error
    }

    pub(crate) fn error_map(&self) -> ErrorMap {
        self.last_error.load().error_map.clone()
    }

    /// Stops the dispatch task. Safe to call more than once.
    pub(crate) fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
