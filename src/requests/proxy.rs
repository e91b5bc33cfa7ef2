use std::sync::Arc;
use std::sync::Weak;

use tokio_util::sync::CancellationToken;

use super::OperationKind;
use super::RequestCore;
use super::RequestParams;
use super::RequestResults;
use crate::ErrorKind;
use crate::ErrorMap;

/// The engine's view of a running request.
///
/// Holds only a weak reference to the request's shared core: a client may
/// drop the request at any point, after which every method here turns into an
/// inert no-op (`false`/`None`) and the engine should stop working on it.
/// Failures are reported by recording an [`ErrorKind`] via [`finish`],
/// never by unwinding toward the submitter.
///
/// [`finish`]: RequestProxy::finish
#[derive(Debug, Clone)]
pub struct RequestProxy {
    core: Weak<RequestCore>,
    kind: OperationKind,
    cancel_token: CancellationToken,
}

impl RequestProxy {
    pub(crate) fn new(core: &Arc<RequestCore>) -> Self {
        Self {
            core: Arc::downgrade(core),
            kind: core.kind(),
            cancel_token: core.cancel_token().clone(),
        }
    }

    /// Operation this request performs.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Snapshot of the input block, or `None` once the client dropped the
    /// request.
    pub fn params(&self) -> Option<RequestParams> {
        let core = self.core.upgrade()?;
        Some(core.with_inner(|inner| inner.params.clone()))
    }

    /// Whether cooperative cancellation was requested (or the request was
    /// abandoned). Engines should poll this between units of work.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Resolves when cancellation is requested; for use in `select!` arms
    /// around long-running engine work.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }

    /// Installs a fully-formed result snapshot. Returns false when the
    /// request is gone or already terminal, in which case the engine should
    /// bail out.
    pub fn update_results(&self, results: RequestResults) -> bool {
        match self.core.upgrade() {
            Some(core) => core.update_results(results),
            None => false,
        }
    }

    /// Installs the per-element error map for batched operations.
    pub fn update_error_map(&self, error_map: ErrorMap) -> bool {
        match self.core.upgrade() {
            Some(core) => core.update_error_map(error_map),
            None => false,
        }
    }

    /// Drives the request to its terminal state with `error` as the overall
    /// outcome. Cancelled work that simply stopped early finishes with
    /// [`ErrorKind::NoError`].
    pub fn finish(&self, error: ErrorKind) -> bool {
        match self.core.upgrade() {
            Some(core) => core.finish(error),
            None => false,
        }
    }
}
