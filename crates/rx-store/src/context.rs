//! State context handed to actions
//!
//! `StateContext` wraps the store's state holder and exposes the operations
//! an action needs: reading and replacing state, shallow patches, nested
//! dispatch, queued dispatch, injected dependencies and explicit
//! persistence through the store's `DataApi`.

use crate::action::Action;
use crate::dependencies::Dependencies;
use crate::dispatcher::Dispatcher;
use crate::error::{ActionError, StoreError};
use crate::patch::shallow_merge;
use crate::state::StateHolder;
use crate::sync::Syncer;
use crate::StoreState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

pub struct StateContext<T> {
    holder: Arc<StateHolder<T>>,
    dependencies: Dependencies,
    syncer: Option<Arc<Syncer>>,
    dispatcher: Dispatcher<T>,
}

impl<T> Clone for StateContext<T> {
    fn clone(&self) -> Self {
        Self {
            holder: Arc::clone(&self.holder),
            dependencies: self.dependencies.clone(),
            syncer: self.syncer.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<T: StoreState> StateContext<T> {
    pub(crate) fn new(
        holder: Arc<StateHolder<T>>,
        dependencies: Dependencies,
        syncer: Option<Arc<Syncer>>,
        dispatcher: Dispatcher<T>,
    ) -> Self {
        Self {
            holder,
            dependencies,
            syncer,
            dispatcher,
        }
    }

    pub(crate) fn holder(&self) -> &StateHolder<T> {
        &self.holder
    }

    pub fn get_state(&self) -> T {
        self.holder.get()
    }

    /// Replace the state wholesale and return the new value
    pub fn set_state(&self, state: T) -> T {
        self.holder.next(state.clone());
        state
    }

    /// Shallow-merge `partial` into the current state and return the new value
    ///
    /// ```rust,ignore
    /// ctx.patch_state(&json!({ "loading": false }))?;
    /// ```
    pub fn patch_state<P>(&self, partial: &P) -> Result<T, StoreError>
    where
        P: Serialize + ?Sized,
    {
        let merged = shallow_merge(&self.holder.get(), partial)?;
        Ok(self.set_state(merged))
    }

    /// Edit a copy of the current state and apply it
    pub fn update_state<F>(&self, f: F) -> T
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.holder.get();
        f(&mut next);
        self.set_state(next)
    }

    /// Run `action` directly against this context
    ///
    /// No callbacks, dev tools or sync run for nested dispatches; they belong
    /// to the outer dispatch.
    pub async fn dispatch<A>(&self, action: &A) -> Result<T, ActionError>
    where
        A: Action<T> + ?Sized,
    {
        log::debug!("Nested dispatch: {}", action.action_type());
        action.execute(self).await
    }

    /// Queue handle for actions that should run after the current dispatch
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Look up an injected dependency
    pub fn get_context<D>(&self, name: &str) -> Option<Arc<D>>
    where
        D: Any + Send + Sync,
    {
        self.dependencies.get(name)
    }

    /// Register dependencies, overriding existing names with a warning
    pub fn set_store_context<I, N>(&self, context: I)
    where
        I: IntoIterator<Item = (N, Arc<dyn Any + Send + Sync>)>,
        N: Into<String>,
    {
        for (name, dependency) in context {
            self.dependencies.insert_arc(name, dependency);
        }
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Replace the state with the persisted one
    ///
    /// Without a data API, or when nothing is stored, the current state is
    /// kept and returned.
    pub async fn restore_state(&self) -> T {
        let Some(syncer) = &self.syncer else {
            log::warn!("Cannot restore state: no data API configured");
            return self.get_state();
        };
        let Some(document) = syncer.load_state().await else {
            log::info!("No stored state found, keeping current state");
            return self.get_state();
        };
        match serde_json::from_value::<T>(serde_json::Value::Object(document)) {
            Ok(state) => {
                log::info!("Restored state from data API");
                self.set_state(state)
            }
            Err(e) => {
                log::error!("Failed to parse stored state: {}", e);
                self.get_state()
            }
        }
    }

    /// Persist the current state, independent of `auto_store`
    pub async fn store_current_state(&self) -> T {
        let state = self.get_state();
        self.persist(&state).await;
        state
    }

    /// Persist the current state merged with `partial` without applying it
    pub async fn store<P>(&self, partial: &P) -> Result<T, StoreError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let merged = shallow_merge(&self.get_state(), partial)?;
        self.persist(&merged).await;
        Ok(merged)
    }

    /// Persist an arbitrary value in the state collection
    ///
    /// The value need not be of the store's state type. Returns `true` once
    /// the data API accepted the document.
    pub async fn store_custom_state<V>(&self, value: &V) -> bool
    where
        V: Serialize + Sync + ?Sized,
    {
        match &self.syncer {
            Some(syncer) => syncer.store_state(value).await,
            None => {
                log::warn!("Cannot store custom state: no data API configured");
                false
            }
        }
    }

    /// Load the document of the state collection as an arbitrary type
    pub async fn get_custom_state<V>(&self) -> Option<V>
    where
        V: DeserializeOwned,
    {
        let Some(syncer) = &self.syncer else {
            log::warn!("Cannot load custom state: no data API configured");
            return None;
        };
        let document = syncer.load_state().await?;
        match serde_json::from_value(serde_json::Value::Object(document)) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("Failed to parse stored custom state: {}", e);
                None
            }
        }
    }

    async fn persist(&self, state: &T) {
        match &self.syncer {
            Some(syncer) => {
                syncer.store_state(state).await;
            }
            None => log::warn!("Cannot store state: no data API configured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{Document, MemoryDataApi, SyncOptions};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::RwLock;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
        label: String,
    }

    fn counter() -> Counter {
        Counter {
            count: 0,
            label: "clicks".to_string(),
        }
    }

    fn context(api: Option<Arc<MemoryDataApi>>) -> StateContext<Counter> {
        let (tx, _rx) = mpsc::unbounded_channel();
        let syncer = api.map(|api| {
            Arc::new(Syncer::new(
                api,
                Arc::new(RwLock::new(SyncOptions::default())),
            ))
        });
        StateContext::new(
            Arc::new(StateHolder::new(counter())),
            Dependencies::new(),
            syncer,
            Dispatcher::new(tx),
        )
    }

    struct Increment;

    #[async_trait]
    impl Action<Counter> for Increment {
        fn action_type(&self) -> &str {
            "INCREMENT"
        }

        async fn execute(&self, ctx: &StateContext<Counter>) -> Result<Counter, ActionError> {
            Ok(ctx.update_state(|s| s.count += 1))
        }
    }

    #[test]
    fn test_set_state_replaces() {
        let ctx = context(None);
        let next = Counter {
            count: 9,
            label: "other".to_string(),
        };
        assert_eq!(ctx.set_state(next.clone()), next);
        assert_eq!(ctx.get_state(), next);
    }

    #[test]
    fn test_patch_state_merges() {
        let ctx = context(None);
        let patched = ctx.patch_state(&json!({ "count": 4 })).unwrap();
        assert_eq!(patched.count, 4);
        assert_eq!(patched.label, "clicks");
        assert_eq!(ctx.get_state(), patched);
    }

    #[test]
    fn test_empty_patch_keeps_fields() {
        let ctx = context(None);
        assert_eq!(ctx.patch_state(&json!({})).unwrap(), counter());
    }

    #[tokio::test]
    async fn test_nested_dispatch_executes_directly() {
        let ctx = context(None);
        let state = ctx.dispatch(&Increment).await.unwrap();
        assert_eq!(state.count, 1);
        assert_eq!(ctx.get_state().count, 1);
    }

    #[test]
    fn test_store_context_dependencies() {
        let ctx = context(None);
        ctx.set_store_context([(
            "api_base",
            Arc::new("https://randomuser.me".to_string()) as Arc<dyn Any + Send + Sync>,
        )]);
        let base = ctx.get_context::<String>("api_base").unwrap();
        assert_eq!(base.as_str(), "https://randomuser.me");
    }

    #[tokio::test]
    async fn test_restore_without_api_keeps_state() {
        let ctx = context(None);
        ctx.patch_state(&json!({ "count": 2 })).unwrap();
        assert_eq!(ctx.restore_state().await.count, 2);
    }

    #[tokio::test]
    async fn test_restore_applies_stored_state() {
        let mut stored = Document::new();
        stored.insert("count".to_string(), json!(41));
        stored.insert("label".to_string(), json!("restored"));
        stored.insert("createdBy".to_string(), json!("user-1"));
        let api = Arc::new(MemoryDataApi::new(Some("user-1")).with_state("state", stored));

        let ctx = context(Some(api));
        let restored = ctx.restore_state().await;

        assert_eq!(
            restored,
            Counter {
                count: 41,
                label: "restored".to_string()
            }
        );
        assert_eq!(ctx.get_state(), restored);
    }

    #[tokio::test]
    async fn test_store_current_state_persists() {
        let api = Arc::new(MemoryDataApi::new(Some("user-1")));
        let ctx = context(Some(api.clone()));

        ctx.store_current_state().await;

        let doc = api.latest_state("state").unwrap();
        assert_eq!(doc.get("count"), Some(&json!(0)));
        assert_eq!(doc.get("createdBy"), Some(&json!("user-1")));
    }

    #[tokio::test]
    async fn test_store_partial_does_not_apply() {
        let api = Arc::new(MemoryDataApi::new(Some("user-1")));
        let ctx = context(Some(api.clone()));

        let stored = ctx.store(&json!({ "count": 5 })).await.unwrap();

        assert_eq!(stored.count, 5);
        assert_eq!(ctx.get_state().count, 0);
        assert_eq!(api.latest_state("state").unwrap().get("count"), Some(&json!(5)));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Preferences {
        theme: String,
        page_size: u32,
    }

    #[tokio::test]
    async fn test_custom_state_roundtrip() {
        let api = Arc::new(MemoryDataApi::new(Some("user-1")));
        let ctx = context(Some(api.clone()));
        let prefs = Preferences {
            theme: "dark".to_string(),
            page_size: 50,
        };

        assert!(ctx.store_custom_state(&prefs).await);

        let doc = api.latest_state("state").unwrap();
        assert_eq!(doc.get("pageSize"), Some(&json!(50)));
        assert_eq!(doc.get("createdBy"), Some(&json!("user-1")));
        // Store state is untouched
        assert_eq!(ctx.get_state(), counter());

        let loaded: Preferences = ctx.get_custom_state().await.unwrap();
        assert_eq!(loaded, prefs);
    }

    #[tokio::test]
    async fn test_custom_state_missing_or_mismatched() {
        let api = Arc::new(MemoryDataApi::new(Some("user-1")));
        let ctx = context(Some(api.clone()));
        assert!(ctx.get_custom_state::<Preferences>().await.is_none());

        ctx.store_current_state().await;
        assert!(ctx.get_custom_state::<Preferences>().await.is_none());
    }

    #[tokio::test]
    async fn test_custom_state_without_data_api() {
        let ctx = context(None);
        assert!(!ctx.store_custom_state(&json!({ "theme": "dark" })).await);
        assert!(ctx.get_custom_state::<Preferences>().await.is_none());
    }
}
