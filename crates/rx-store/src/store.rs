//! Store - holds the state and runs the dispatch pipeline
//!
//! ```text
//! dispatch(action)
//!   → action.execute(ctx)      (computes the next state)
//!   → state holder             (subscribers notified)
//!   → dev tools                (if enabled)
//!   → callbacks                (registration order)
//!   → DataApi                  (if configured, auto_store on, action storable)
//! ```
//!
//! Dispatches are serialized: a dispatch waits for every earlier one to
//! finish, so concurrent callers never read a stale state.

use crate::action::{Action, ActionRecord};
use crate::context::StateContext;
use crate::dependencies::Dependencies;
use crate::devtools::{DevTools, LogDevTools};
use crate::dispatcher::{Dispatcher, QueuedAction};
use crate::error::StoreError;
use crate::state::{StateHolder, Subscription};
use crate::sync::{DataApi, SyncOptions, Syncer};
use crate::StoreState;
use std::any::Any;
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Callback invoked after every dispatch with `(action, old_state, new_state, context)`
pub type Callback<T> = Arc<dyn Fn(&ActionRecord, &T, &T, &Dependencies) + Send + Sync>;

struct StoreInner<T> {
    ctx: StateContext<T>,
    callbacks: RwLock<Vec<Callback<T>>>,
    dev_tools: Option<Box<dyn DevTools>>,
    syncer: Option<Arc<Syncer>>,
    sync_options: Arc<RwLock<SyncOptions>>,
    queue: tokio::sync::Mutex<()>,
    action_rx: Mutex<Option<mpsc::UnboundedReceiver<QueuedAction<T>>>>,
}

/// Action-dispatch store
///
/// Cloning a `Store` yields another handle to the same state.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: StoreState> Store<T> {
    /// Create a store without dev tools or data API
    pub fn new(initial_state: T) -> Self {
        Self::builder(initial_state).build()
    }

    pub fn builder(initial_state: T) -> StoreBuilder<T> {
        StoreBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> T {
        self.inner.ctx.get_state()
    }

    /// Subscribe to state replacements; `f` is called right away with the current state
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.ctx.holder().subscribe(f)
    }

    /// Observable view on the state
    pub fn watch(&self) -> watch::Receiver<T> {
        self.inner.ctx.holder().watch()
    }

    /// The context actions run against
    pub fn context(&self) -> &StateContext<T> {
        &self.inner.ctx
    }

    pub fn dependencies(&self) -> &Dependencies {
        self.inner.ctx.dependencies()
    }

    /// Register dependencies reachable from actions via `StateContext::get_context`
    pub fn set_store_context<I, N>(&self, context: I)
    where
        I: IntoIterator<Item = (N, Arc<dyn Any + Send + Sync>)>,
        N: Into<String>,
    {
        self.inner.ctx.set_store_context(context);
    }

    /// Register a callback; callbacks run in registration order after each dispatch
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&ActionRecord, &T, &T, &Dependencies) + Send + Sync + 'static,
    {
        self.inner
            .callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(callback));
    }

    /// Dispatch an action and return the resulting state
    ///
    /// # Example
    /// ```rust,ignore
    /// let state = store.dispatch(LoadAction).await?;
    /// ```
    pub async fn dispatch(&self, action: impl Action<T>) -> Result<T, StoreError> {
        self.dispatch_dyn(&action).await
    }

    /// Dispatch an action given by reference or as a trait object
    pub async fn dispatch_dyn(&self, action: &dyn Action<T>) -> Result<T, StoreError> {
        let _turn = self.inner.queue.lock().await;
        let inner = &self.inner;
        let action_type = action.action_type().to_string();
        log::debug!("Dispatch: {}", action_type);

        let old_state = inner.ctx.get_state();
        let new_state = action
            .execute(&inner.ctx)
            .await
            .map_err(|source| StoreError::Action {
                action_type: action_type.clone(),
                source,
            })?;
        self.apply_result(&new_state)?;

        if let Some(dev_tools) = &inner.dev_tools {
            dev_tools.send(&action_type, &serde_json::to_value(&new_state)?);
        }

        let record = ActionRecord::from_action(action);
        let callbacks: Vec<Callback<T>> = inner
            .callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for callback in callbacks {
            callback(&record, &old_state, &new_state, inner.ctx.dependencies());
        }

        if let Some(syncer) = &inner.syncer {
            syncer.after_dispatch(&record, &new_state).await;
        }

        Ok(new_state)
    }

    /// Make the action's result the current state
    ///
    /// Actions usually already applied it through the context; subscribers
    /// are only notified again if the result differs from the current state.
    fn apply_result(&self, new_state: &T) -> Result<(), StoreError> {
        let current = self.inner.ctx.get_state();
        if serde_json::to_value(&current)? != serde_json::to_value(new_state)? {
            self.inner.ctx.set_state(new_state.clone());
        }
        Ok(())
    }

    /// Handle for queueing actions
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        self.inner.ctx.dispatcher()
    }

    /// Spawn the task that dispatches queued actions in order
    ///
    /// Returns `None` if the worker was already started. The task stops once
    /// the store and every `Dispatcher` handle are dropped.
    pub fn spawn_worker(&self) -> Option<JoinHandle<()>> {
        let taken = self
            .inner
            .action_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(mut action_rx) = taken else {
            log::warn!("Store worker already running");
            return None;
        };
        let weak: Weak<StoreInner<T>> = Arc::downgrade(&self.inner);

        Some(tokio::spawn(async move {
            log::debug!("Store worker started");
            while let Some(action) = action_rx.recv().await {
                let Some(inner) = weak.upgrade() else {
                    log::info!(
                        "Store dropped, discarding queued action '{}'",
                        action.action_type()
                    );
                    break;
                };
                let store = Store { inner };
                if let Err(e) = store.dispatch_dyn(action.as_ref()).await {
                    log::error!("Queued dispatch failed: {}", e);
                }
            }
            log::debug!("Store worker stopped");
        }))
    }

    /// Replace the state with the one persisted by the data API
    pub async fn restore_state(&self) -> T {
        let _turn = self.inner.queue.lock().await;
        self.inner.ctx.restore_state().await
    }

    pub fn sync_options(&self) -> SyncOptions {
        self.inner
            .sync_options
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Change the sync options of a running store
    pub fn override_sync_options<F>(&self, f: F)
    where
        F: FnOnce(&mut SyncOptions),
    {
        let mut options = self
            .inner
            .sync_options
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut options);
        log::debug!("Sync options overridden: {:?}", *options);
    }

    /// `true` if a data API is configured
    pub fn has_data_api(&self) -> bool {
        self.inner.syncer.is_some()
    }
}

/// Builder for a `Store`
pub struct StoreBuilder<T> {
    initial_state: T,
    dev_tools: Option<Box<dyn DevTools>>,
    data_api: Option<Arc<dyn DataApi>>,
    sync_options: SyncOptions,
    dependencies: Dependencies,
}

impl<T: StoreState> StoreBuilder<T> {
    pub fn new(initial_state: T) -> Self {
        Self {
            initial_state,
            dev_tools: None,
            data_api: None,
            sync_options: SyncOptions::default(),
            dependencies: Dependencies::new(),
        }
    }

    /// Forward every dispatch to `LogDevTools`
    pub fn dev_tools(mut self, enabled: bool) -> Self {
        self.dev_tools = enabled.then(|| Box::new(LogDevTools) as Box<dyn DevTools>);
        self
    }

    /// Forward every dispatch to a custom dev tools sink
    pub fn dev_tools_sink(mut self, sink: impl DevTools + 'static) -> Self {
        self.dev_tools = Some(Box::new(sink));
        self
    }

    pub fn data_api(mut self, api: Arc<dyn DataApi>) -> Self {
        self.data_api = Some(api);
        self
    }

    pub fn sync_options(mut self, options: SyncOptions) -> Self {
        self.sync_options = options;
        self
    }

    /// Register a dependency before the store is built
    pub fn dependency<D>(self, name: impl Into<String>, dependency: D) -> Self
    where
        D: Any + Send + Sync,
    {
        self.dependencies.insert(name, dependency);
        self
    }

    pub fn build(self) -> Store<T> {
        let holder = Arc::new(StateHolder::new(self.initial_state));
        let sync_options = Arc::new(RwLock::new(self.sync_options));
        let syncer = self
            .data_api
            .map(|api| Arc::new(Syncer::new(api, Arc::clone(&sync_options))));
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let ctx = StateContext::new(
            holder,
            self.dependencies,
            syncer.clone(),
            Dispatcher::new(action_tx),
        );

        if let Some(dev_tools) = &self.dev_tools {
            match serde_json::to_value(ctx.get_state()) {
                Ok(state) => dev_tools.init(&state),
                Err(e) => log::warn!("Dev tools: failed to serialize initial state: {}", e),
            }
        }

        Store {
            inner: Arc::new(StoreInner {
                ctx,
                callbacks: RwLock::new(Vec::new()),
                dev_tools: self.dev_tools,
                syncer,
                sync_options,
                queue: tokio::sync::Mutex::new(()),
                action_rx: Mutex::new(Some(action_rx)),
            }),
        }
    }
}
