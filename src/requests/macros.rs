/// Implements the lifecycle surface shared by every request type: state and
/// error accessors, manager binding, submission, cancellation and waiting.
/// All of them go through the one lock owned by the request's core.
macro_rules! impl_request_common {
    ($request:ident) => {
        impl $request {
            /// Operation this request performs; fixed at construction.
            pub fn operation_kind(&self) -> crate::OperationKind {
                self.core.kind()
            }

            /// Current lifecycle state.
            pub fn state(&self) -> crate::RequestState {
                self.core.state()
            }

            pub fn is_finished(&self) -> bool {
                self.core.state().is_terminal()
            }

            /// Overall outcome recorded by the engine. Meaningful once the
            /// request is finished; partial results accompanying a non-clean
            /// error are best-effort but internally consistent.
            pub fn error(&self) -> crate::ErrorKind {
                self.core.error()
            }

            /// Per-element errors for batched operations, keyed by input
            /// index. An absent key means that element succeeded.
            pub fn error_map(&self) -> crate::ErrorMap {
                self.core.error_map()
            }

            /// Binds this request to `manager`. The binding is non-owning:
            /// if the manager is dropped first, submission fails cleanly with
            /// [`RequestError::NotPermitted`](crate::RequestError::NotPermitted).
            pub fn set_manager(&mut self, manager: &crate::OrganizerManager) {
                self.core.bind_manager(manager.downgrade());
            }

            /// Submits the request to the bound manager's engine and returns
            /// without waiting for it. Fails if no live manager is bound or
            /// the request is not inactive.
            pub fn start(&self) -> crate::Result<()> {
                self.core.start()?;
                Ok(())
            }

            /// Requests cooperative cancellation; see
            /// [`RequestState::Cancelling`](crate::RequestState::Cancelling).
            pub fn cancel(&self) {
                self.core.cancel();
            }

            /// Waits until the request is terminal or `timeout` elapses;
            /// returns whether it finished. Callable from any task or thread.
            pub async fn wait_for_finished(&self, timeout: std::time::Duration) -> bool {
                self.core.wait_for_finished(timeout).await
            }
        }

        impl Default for $request {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Drop for $request {
            fn drop(&mut self) {
                self.core.abandon();
            }
        }
    };
}

pub(crate) use impl_request_common;
