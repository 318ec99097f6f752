//! Persistence adapter contract

use crate::error::SyncError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A persisted state or action record
pub type Document = Map<String, Value>;

/// External document store a `Store` mirrors its state and actions to
///
/// The store resolves collection names from its `SyncOptions` and passes
/// them in, so one adapter serves any number of stores.
///
/// # Example
///
/// ```rust,ignore
/// let api: Arc<dyn DataApi> = Arc::new(MemoryDataApi::new(Some("user-123")));
/// let store = Store::builder(initial).data_api(api).build();
/// ```
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Id of the current user, if one is known
    fn user_id(&self) -> Option<String>;

    /// Load the current user's state document from `collection`
    ///
    /// Returns `Ok(None)` if nothing was stored yet.
    async fn get_state(&self, collection: &str) -> Result<Option<Document>, SyncError>;

    /// Replace the current user's state document in `collection`
    async fn set_state(&self, collection: &str, document: Document) -> Result<(), SyncError>;

    /// Append an action document to `collection` under `id`
    async fn store_action(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), SyncError>;
}
