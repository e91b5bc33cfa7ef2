use crate::DetailKind;

/// Callback interface for observing one item.
///
/// Implementations are invoked from the manager's dispatch task, never from
/// the thread that performed the mutation, and never while any registry lock
/// is held. A callback may synchronously drop its own observer or register
/// new ones.
pub trait ItemWatcher: Send + Sync + 'static {
    /// The watched item was modified. `details` lists the touched detail
    /// categories; an empty slice means the scope is unknown and the whole
    /// item should be re-read.
    fn item_changed(&self, details: &[DetailKind]);

    /// The watched item was removed from the store.
    fn item_removed(&self);
}
