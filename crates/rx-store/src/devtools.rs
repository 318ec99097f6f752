//! Dev tools integration
//!
//! When enabled on a store, every dispatch forwards its action type and the
//! resulting state to a `DevTools` sink.

use serde_json::Value;

/// Receives the state history of a store
pub trait DevTools: Send + Sync {
    /// Called once with the initial state when the store is built
    fn init(&self, state: &Value);

    /// Called after each dispatch with the action type and new state
    fn send(&self, action_type: &str, state: &Value);
}

/// Default sink writing to the `rx_store::devtools` log target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDevTools;

impl DevTools for LogDevTools {
    fn init(&self, state: &Value) {
        log::debug!(target: "rx_store::devtools", "init: {}", state);
    }

    fn send(&self, action_type: &str, state: &Value) {
        log::debug!(target: "rx_store::devtools", "{}: {}", action_type, state);
    }
}
