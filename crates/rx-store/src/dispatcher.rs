//! Dispatcher for queued actions
//!
//! Actions sent through a `Dispatcher` are processed by the store's worker
//! task (see `Store::spawn_worker`) as full dispatches, one after another in
//! the order they were sent. Actions use it to trigger follow-up work that
//! must run after the current dispatch has finished.

use crate::action::Action;
use tokio::sync::mpsc;

pub(crate) type QueuedAction<T> = Box<dyn Action<T>>;

/// Handle for queueing actions onto a store
pub struct Dispatcher<T> {
    action_tx: mpsc::UnboundedSender<QueuedAction<T>>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            action_tx: self.action_tx.clone(),
        }
    }
}

impl<T: 'static> Dispatcher<T> {
    pub(crate) fn new(action_tx: mpsc::UnboundedSender<QueuedAction<T>>) -> Self {
        Self { action_tx }
    }

    /// Queue an action
    ///
    /// The action runs once every previously queued action has been dispatched.
    pub fn dispatch(&self, action: impl Action<T> + 'static) {
        self.dispatch_boxed(Box::new(action));
    }

    pub fn dispatch_boxed(&self, action: Box<dyn Action<T>>) {
        let action_type = action.action_type().to_string();
        if self.action_tx.send(action).is_err() {
            log::error!("Dispatcher: failed to queue action '{}': store is gone", action_type);
        }
    }

    /// `true` once the store's queue has been closed
    pub fn is_closed(&self) -> bool {
        self.action_tx.is_closed()
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.action_tx.is_closed())
            .finish()
    }
}
