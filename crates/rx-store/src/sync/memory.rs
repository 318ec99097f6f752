//! In-memory `DataApi`
//!
//! Keeps the latest state document per collection and every stored action.
//! Useful as a test double and for stores that only need an undo history
//! within one process.

use super::data_api::{DataApi, Document};
use crate::error::SyncError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

/// A stored action document with its collection and id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAction {
    pub collection: String,
    pub id: String,
    pub document: Document,
}

#[derive(Debug, Default)]
pub struct MemoryDataApi {
    user_id: RwLock<Option<String>>,
    states: Mutex<HashMap<String, Document>>,
    actions: Mutex<Vec<StoredAction>>,
    set_state_calls: AtomicUsize,
}

impl MemoryDataApi {
    pub fn new(user_id: Option<&str>) -> Self {
        Self {
            user_id: RwLock::new(user_id.map(str::to_string)),
            ..Self::default()
        }
    }

    /// Seed the state document of `collection`
    pub fn with_state(self, collection: &str, document: Document) -> Self {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(collection.to_string(), document);
        self
    }

    /// Switch the logged-in user
    pub fn set_user_id(&self, user_id: Option<&str>) {
        *self
            .user_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user_id.map(str::to_string);
    }

    /// Latest state document written to `collection`
    pub fn latest_state(&self, collection: &str) -> Option<Document> {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(collection)
            .cloned()
    }

    /// Every action stored so far, in order
    pub fn actions(&self) -> Vec<StoredAction> {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of `set_state` calls received
    pub fn set_state_calls(&self) -> usize {
        self.set_state_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataApi for MemoryDataApi {
    fn user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn get_state(&self, collection: &str) -> Result<Option<Document>, SyncError> {
        Ok(self.latest_state(collection))
    }

    async fn set_state(&self, collection: &str, document: Document) -> Result<(), SyncError> {
        self.set_state_calls.fetch_add(1, Ordering::SeqCst);
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(collection.to_string(), document);
        Ok(())
    }

    async fn store_action(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), SyncError> {
        self.actions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(StoredAction {
                collection: collection.to_string(),
                id: id.to_string(),
                document,
            });
        Ok(())
    }
}
