//! Organizer Data-Access Error Hierarchy
//!
//! Defines the operation error taxonomy surfaced through requests and the
//! manager's last-error slot, plus the crate-level error type used by
//! configuration loading and request submission.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Per-element errors for batched operations, keyed by input index.
///
/// An absent key means that element succeeded.
pub type ErrorMap = std::collections::BTreeMap<usize, ErrorKind>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request lifecycle violations
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Settings loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manager construction failures, such as building outside a runtime
    #[error("Manager build error: {0}")]
    Build(String),
}

/// Submission failures raised by [`start`](crate::ItemFetchRequest::start).
///
/// These are the only failures reported through the calling thread; everything
/// an engine encounters is recorded as an [`ErrorKind`] on the request instead.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    /// The request has no bound manager, or the manager is already gone
    #[error("Request is not bound to a live manager")]
    NotPermitted,

    /// The request was submitted while not inactive
    #[error("Request was already started (state: {state})")]
    AlreadyStarted { state: &'static str },
}

/// Outcome classification for organizer operations.
///
/// Carried in each request's error slot and re-published through
/// [`error()`](crate::OrganizerManager::error) after synchronous calls.
/// Engines record one of these and still drive the request to its terminal
/// state; failures never unwind across the execution boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum ErrorKind {
    /// The operation completed without error
    #[default]
    #[error("no error")]
    NoError,

    /// The referenced item or collection does not exist
    #[error("the referenced item or collection does not exist")]
    DoesNotExist,

    /// The item or collection already exists and may not be created again
    #[error("the item or collection already exists")]
    AlreadyExists,

    /// A detail carried by the item failed validation
    #[error("the item carries an invalid detail")]
    InvalidDetail,

    /// The data store is locked by another process or operation
    #[error("the data store is locked")]
    Locked,

    /// A detail exists but is not readable or writable by this client
    #[error("access to the detail was denied")]
    DetailAccess,

    /// The operation is not permitted on the target
    #[error("the operation is not permitted")]
    Permissions,

    /// The engine ran out of memory while servicing the operation
    #[error("out of memory")]
    OutOfMemory,

    /// The engine does not support the requested operation or filter
    #[error("the operation is not supported by this engine")]
    NotSupported,

    /// A supplied argument was malformed
    #[error("bad argument")]
    BadArgument,

    /// An error that fits no other classification
    #[error("unspecified error")]
    Unspecified,

    /// The record changed underneath the operation
    #[error("version mismatch")]
    VersionMismatch,

    /// An engine-imposed limit was reached
    #[error("limit reached")]
    LimitReached,

    /// The item type contradicts the details it carries
    #[error("invalid item type")]
    InvalidItemType,

    /// The referenced collection is unknown or unusable
    #[error("invalid collection")]
    InvalidCollection,

    /// The occurrence is malformed or its parent is missing
    #[error("invalid occurrence")]
    InvalidOccurrence,

    /// The operation did not complete within the configured wait bound
    #[error("operation timed out")]
    Timeout,
}

impl ErrorKind {
    /// Returns true for every classification except [`ErrorKind::NoError`].
    pub fn is_error(&self) -> bool {
        !matches!(self, ErrorKind::NoError)
    }
}
