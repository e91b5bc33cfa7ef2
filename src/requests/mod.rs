//! Asynchronous request machinery.
//!
//! A request is the unit of asynchronous work between a client and an engine:
//! created inactive, submitted through a manager, executed out-of-line, and
//! driven to a terminal state by the engine. One mutex per request guards its
//! state, parameters, results and errors as a single block; the submitting
//! side and the engine both take it for the duration of each access only, so
//! partial results can be read while the engine is still writing.
//!
//! The engine never owns a request. It works through [`RequestProxy`], which
//! holds a weak reference and goes inert if the client drops the request
//! mid-flight.

mod base;
mod collection_requests;
mod item_requests;
mod macros;
mod params;
mod proxy;

pub use base::OperationKind;
pub use base::RequestState;
pub(crate) use base::RequestCore;
pub use collection_requests::*;
pub use item_requests::*;
pub use params::*;
pub use proxy::*;
