//! Dispatcher for sending actions into the store's queue.

use tokio::sync::mpsc;

use crate::actions::Action;

/// Hands actions to the owning store, from the interactive context or from
/// background tasks holding a clone.
///
/// The queue is closed when the store is dropped; anything a background task
/// dispatches after that is logged and discarded instead of being applied to
/// a torn-down session. In-flight remote calls are not aborted; only their
/// delivery is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Action>,
}

impl Dispatcher {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }

    /// Queue an action; processed in submission order by the next
    /// [`Store::pump`](crate::store::Store::pump).
    pub fn dispatch(&self, action: Action) {
        if self.tx.send(action).is_err() {
            log::debug!("Discarding action dispatched after the session ended");
        }
    }
}
