//! Action-dispatch state store
//!
//! This crate provides:
//! - An observable state holder with synchronous subscribers
//! - Actions that asynchronously compute the next state
//! - A `Store` that dispatches actions, notifies callbacks and forwards
//!   state/action history to an optional `DataApi`
//!
//! ```text
//! Action → execute(ctx) → new state → subscribers → callbacks → DataApi
//! ```

pub mod action;
pub mod context;
pub mod dependencies;
pub mod devtools;
pub mod dispatcher;
pub mod error;
pub mod patch;
pub mod state;
pub mod store;
pub mod sync;
pub mod utils;

pub use action::{Action, ActionRecord};
pub use context::StateContext;
pub use dependencies::Dependencies;
pub use devtools::{DevTools, LogDevTools};
pub use dispatcher::Dispatcher;
pub use error::{ActionError, PatchError, StoreError, SyncError};
pub use state::{StateHolder, Subscription};
pub use store::{Store, StoreBuilder};
pub use sync::{CollectionName, DataApi, Document, MemoryDataApi, SyncOptions, SyncTarget};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Bounds every state value held by a store must satisfy
///
/// Serialization is required for shallow merges, dev tools and sync.
pub trait StoreState: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

impl<T> StoreState for T where T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}
