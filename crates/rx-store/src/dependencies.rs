//! Named dependencies injected into a store
//!
//! Each store owns its own map; actions reach it through
//! `StateContext::get_context`.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Dependency = Arc<dyn Any + Send + Sync>;

/// Store-owned name → dependency lookup
#[derive(Clone, Default)]
pub struct Dependencies {
    inner: Arc<RwLock<HashMap<String, Dependency>>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dependency, overriding (with a warning) an existing one
    pub fn insert<D>(&self, name: impl Into<String>, dependency: D)
    where
        D: Any + Send + Sync,
    {
        self.insert_arc(name, Arc::new(dependency));
    }

    /// Register an already shared dependency
    pub fn insert_arc(&self, name: impl Into<String>, dependency: Dependency) {
        let name = name.into();
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if map.contains_key(&name) {
            log::warn!(
                "{} is already added in the store context. Overriding current value",
                name
            );
        }
        map.insert(name, dependency);
    }

    /// Look up a dependency by name and type
    ///
    /// Returns `None` if the name is unknown or registered with another type.
    pub fn get<D>(&self, name: &str) -> Option<Arc<D>>
    where
        D: Any + Send + Sync,
    {
        let map = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let dependency = Arc::clone(map.get(name)?);
        match dependency.downcast::<D>() {
            Ok(typed) => Some(typed),
            Err(_) => {
                log::warn!("Store context entry '{}' has a different type", name);
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|map| map.contains_key(name))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .inner
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("Dependencies").field("names", &names).finish()
    }
}
