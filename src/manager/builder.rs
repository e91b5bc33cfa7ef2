use std::sync::Arc;
use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;

use super::ManagerShared;
use super::OrganizerManager;
use crate::ChangeEvent;
use crate::Error;
use crate::MemOrganizerEngine;
use crate::OrganizerEngine;
use crate::OrganizerConfig;
use crate::Result;

/// Builds an [`OrganizerManager`] over a chosen engine and configuration.
///
/// Without an explicit engine the manager runs on a fresh in-memory store.
/// `build` must run inside a tokio runtime; the manager captures the runtime
/// handle for request execution and event dispatch.
#[derive(Default)]
pub struct ManagerBuilder {
    engine: Option<Arc<dyn OrganizerEngine>>,
    config: Option<OrganizerConfig>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: Arc<dyn OrganizerEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_config(mut self, config: OrganizerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<OrganizerManager> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let runtime =
            Handle::try_current().map_err(|e| Error::Build(e.to_string()))?;
        let engine = self.engine.unwrap_or_else(|| {
            Arc::new(MemOrganizerEngine::with_expansion_cap(
                config.expansion.max_generated_occurrences,
            ))
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let shared = Arc::new(ManagerShared::new(
            Arc::clone(&engine),
            config,
            shutdown_tx,
            runtime.clone(),
        ));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        engine.register_change_listener(event_tx);
        runtime.spawn(dispatch_loop(
            Arc::downgrade(&shared),
            event_rx,
            shutdown_rx,
        ));

        info!(manager = %engine.manager_name(), "organizer manager started");
        Ok(OrganizerManager::from_shared(shared))
    }
}

/// Single consumer of the engine's change events. Consuming from one task
/// keeps delivery to each watcher in arrival order.
async fn dispatch_loop(
    shared: Weak<ManagerShared>,
    mut events: mpsc::UnboundedReceiver<ChangeEvent>,
    mut shutdown: watch::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                let Some(shared) = shared.upgrade() else { break };
                shared.dispatch(event);
            }
        }
    }
    debug!("change dispatch task stopped");
}
