//! State and action mirroring through a `DataApi`
//!
//! After each qualifying dispatch the store hands the new state and the
//! action record to a `Syncer`, which builds the documents according to the
//! current `SyncOptions` and writes them through the adapter.
//!
//! Adapter failures never fail a dispatch: they are logged and the store
//! carries on with its in-memory state.

pub mod data_api;
pub mod document;
pub mod memory;
pub mod options;

pub use data_api::{DataApi, Document};
pub use memory::{MemoryDataApi, StoredAction};
pub use options::{CollectionName, SyncOptions, SyncTarget};

use crate::action::ActionRecord;
use crate::error::SyncError;
use crate::utils::date_id;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Runs the sync pipeline for one store
pub(crate) struct Syncer {
    api: Arc<dyn DataApi>,
    options: Arc<RwLock<SyncOptions>>,
}

impl Syncer {
    pub(crate) fn new(api: Arc<dyn DataApi>, options: Arc<RwLock<SyncOptions>>) -> Self {
        Self { api, options }
    }

    fn options(&self) -> SyncOptions {
        self.options
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Mirror a finished dispatch, honouring `auto_store` and the per-target `sync` flags
    pub(crate) async fn after_dispatch<T: Serialize>(&self, record: &ActionRecord, state: &T) {
        let options = self.options();
        if !options.auto_store {
            return;
        }
        if record.never_store_or_log {
            log::debug!("Action '{}' is never stored or logged", record.action_type);
            return;
        }
        if options.state.sync {
            self.write_state(&options, state).await;
        }
        if options.actions.sync {
            self.write_action(&options, record).await;
        }
    }

    /// Persist `state` regardless of `auto_store` and the `sync` flag
    pub(crate) async fn store_state<T: Serialize + ?Sized>(&self, state: &T) -> bool {
        let options = self.options();
        self.write_state(&options, state).await
    }

    /// Load the persisted state document
    pub(crate) async fn load_state(&self) -> Option<Document> {
        let Some(collection) = self.options().state_collection() else {
            log::error!("Cannot restore state: state collection name is not set");
            return None;
        };
        match self.api.get_state(&collection).await {
            Ok(document) => document,
            Err(e) => {
                log::error!("Failed to load state from '{}': {}", collection, e);
                None
            }
        }
    }

    async fn write_state<T>(&self, options: &SyncOptions, state: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        let Some(collection) = options.state_collection() else {
            log::error!("Cannot store state: state collection name is not set");
            return false;
        };
        let user_id = self.api.user_id();
        let document = match document::state_document(state, &options.state, user_id.as_deref())
        {
            Ok(document) => document,
            Err(SyncError::NotLoggedIn) => {
                log::error!("Cannot store state in '{}': no user is logged in", collection);
                return false;
            }
            Err(e) => {
                log::error!("Failed to build state document: {}", e);
                return false;
            }
        };
        match self.api.set_state(&collection, document).await {
            Ok(()) => {
                log::debug!("Stored state in '{}'", collection);
                true
            }
            Err(e) => {
                log::error!("Failed to store state in '{}': {}", collection, e);
                false
            }
        }
    }

    async fn write_action(&self, options: &SyncOptions, record: &ActionRecord) -> bool {
        let Some(collection) = options.action_collection() else {
            log::error!("Cannot store action: action collection name is not set");
            return false;
        };
        let user_id = self.api.user_id();
        let document =
            match document::action_document(record, &options.actions, user_id.as_deref()) {
                Ok(document) => document,
                Err(e) => {
                    log::error!("Failed to build document for '{}': {}", record.action_type, e);
                    return false;
                }
            };
        let id = date_id();
        match self.api.store_action(&collection, &id, document).await {
            Ok(()) => {
                log::debug!("Stored action '{}' as {}/{}", record.action_type, collection, id);
                true
            }
            Err(e) => {
                log::error!("Failed to store action '{}': {}", record.action_type, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    fn syncer(api: Arc<dyn DataApi>, options: SyncOptions) -> Syncer {
        Syncer::new(api, Arc::new(RwLock::new(options)))
    }

    struct FailingApi;

    #[async_trait]
    impl DataApi for FailingApi {
        fn user_id(&self) -> Option<String> {
            Some("user".to_string())
        }

        async fn get_state(&self, _collection: &str) -> Result<Option<Document>, SyncError> {
            Err(SyncError::Unavailable("offline".to_string()))
        }

        async fn set_state(&self, _collection: &str, _document: Document) -> Result<(), SyncError> {
            Err(SyncError::Unavailable("offline".to_string()))
        }

        async fn store_action(
            &self,
            _collection: &str,
            _id: &str,
            _document: Document,
        ) -> Result<(), SyncError> {
            Err(SyncError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_after_dispatch_writes_state_and_action() {
        let api = Arc::new(MemoryDataApi::new(Some("user-123")));
        let syncer = syncer(api.clone(), SyncOptions::default());

        syncer
            .after_dispatch(&ActionRecord::type_only("LOAD"), &json!({ "loading": false }))
            .await;

        assert_eq!(api.set_state_calls(), 1);
        let actions = api.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].collection, "actions");
        assert_eq!(actions[0].id.len(), 17);
    }

    #[tokio::test]
    async fn test_auto_store_off_writes_nothing() {
        let api = Arc::new(MemoryDataApi::new(Some("user-123")));
        let options = SyncOptions {
            auto_store: false,
            ..SyncOptions::default()
        };
        let syncer = syncer(api.clone(), options);

        syncer
            .after_dispatch(&ActionRecord::type_only("LOAD"), &json!({}))
            .await;

        assert_eq!(api.set_state_calls(), 0);
        assert!(api.actions().is_empty());

        // Explicit stores still go through
        assert!(syncer.store_state(&json!({ "a": 1 })).await);
        assert_eq!(api.set_state_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_collection_name_skips_write() {
        let api = Arc::new(MemoryDataApi::new(None));
        let options = SyncOptions {
            state: SyncTarget::default().with_collection(""),
            ..SyncOptions::default()
        };
        let syncer = syncer(api.clone(), options);

        assert!(!syncer.store_state(&json!({})).await);
        assert!(syncer.load_state().await.is_none());
        assert_eq!(api.set_state_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_user_skips_state_but_stores_action() {
        let api = Arc::new(MemoryDataApi::new(None));
        let syncer = syncer(api.clone(), SyncOptions::default());

        syncer
            .after_dispatch(&ActionRecord::type_only("LOAD"), &json!({ "n": 1 }))
            .await;

        assert_eq!(api.set_state_calls(), 0);
        assert!(api.latest_state("state").is_none());
        assert_eq!(api.actions().len(), 1);
        assert!(!syncer.store_state(&json!({ "n": 2 })).await);
    }

    #[tokio::test]
    async fn test_missing_user_allowed_without_add_user_id() {
        let api = Arc::new(MemoryDataApi::new(None));
        let options = SyncOptions {
            state: SyncTarget::default().with_user_id(false),
            ..SyncOptions::default()
        };
        let syncer = syncer(api.clone(), options);

        assert!(syncer.store_state(&json!({ "n": 1 })).await);
        assert_eq!(api.set_state_calls(), 1);
    }

    #[tokio::test]
    async fn test_adapter_failures_are_swallowed() {
        let syncer = syncer(Arc::new(FailingApi), SyncOptions::default());

        syncer
            .after_dispatch(&ActionRecord::type_only("LOAD"), &json!({}))
            .await;
        assert!(!syncer.store_state(&json!({})).await);
        assert!(syncer.load_state().await.is_none());
    }
}
