//! Error types for the store and its sync adapters

use thiserror::Error;

/// Boxed error source carried by action failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned from `Store::dispatch` and context operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The action's `execute` failed.
    #[error("Action '{action_type}' failed: {source}")]
    Action {
        action_type: String,
        #[source]
        source: ActionError,
    },

    /// A partial state could not be merged.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The state could not be serialized.
    #[error("Failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error raised by an action's `execute`.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A free-form failure message.
    #[error("{0}")]
    Failed(String),

    /// A state operation inside the action failed.
    #[error(transparent)]
    Store(#[from] Box<StoreError>),

    /// Any other error source.
    #[error(transparent)]
    Other(BoxError),
}

impl ActionError {
    /// Create a failure from a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap an arbitrary error source
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        Self::Store(Box::new(err))
    }
}

/// Errors that can occur while shallow-merging a partial state.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The state or partial does not serialize to a JSON object.
    #[error("Cannot shallow-merge {0}: not an object")]
    NotAnObject(&'static str),

    /// Serializing or deserializing failed.
    #[error("Failed to merge partial state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by a `DataApi` implementation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backing store is not reachable or not configured.
    #[error("Data API unavailable: {0}")]
    Unavailable(String),

    /// No user is known to the adapter.
    #[error("No user is logged in")]
    NotLoggedIn,

    /// Reading or writing the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The value does not serialize to a JSON object.
    #[error("Cannot persist {0}: not a document")]
    NotADocument(&'static str),
}
