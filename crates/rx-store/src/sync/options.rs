//! Sync configuration
//!
//! Describes whether and where a store mirrors its state and action history
//! through a `DataApi`, whether to stamp records with the user id, and which
//! fields to redact before persisting.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_STATE_COLLECTION: &str = "state";
pub const DEFAULT_ACTION_COLLECTION: &str = "actions";

/// Collection name, either fixed or produced on every use
#[derive(Clone)]
pub enum CollectionName {
    Fixed(String),
    Computed(Arc<dyn Fn() -> String + Send + Sync>),
}

impl CollectionName {
    /// Name produced by `f` each time the collection is resolved
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    pub fn resolve(&self) -> String {
        match self {
            Self::Fixed(name) => name.clone(),
            Self::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(name) => f.debug_tuple("Fixed").field(name).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for CollectionName {
    fn from(name: &str) -> Self {
        Self::Fixed(name.to_string())
    }
}

impl From<String> for CollectionName {
    fn from(name: String) -> Self {
        Self::Fixed(name)
    }
}

impl Serialize for CollectionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.resolve())
    }
}

impl<'de> Deserialize<'de> for CollectionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Fixed)
    }
}

/// Sync settings for one kind of record (state or actions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTarget {
    /// Mirror this kind of record after each dispatch
    pub sync: bool,
    /// Collection to write to; the kind's default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<CollectionName>,
    /// Stamp records with `createdBy` = the adapter's user id
    pub add_user_id: bool,
    /// Top-level fields removed before persisting
    pub excluded_fields: Vec<String>,
}

impl Default for SyncTarget {
    fn default() -> Self {
        Self {
            sync: true,
            collection_name: None,
            add_user_id: true,
            excluded_fields: Vec::new(),
        }
    }
}

impl SyncTarget {
    /// Target that never syncs automatically
    pub fn disabled() -> Self {
        Self {
            sync: false,
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, name: impl Into<CollectionName>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn with_user_id(mut self, add_user_id: bool) -> Self {
        self.add_user_id = add_user_id;
        self
    }

    pub fn with_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the collection name, falling back to `default` when unset
    ///
    /// Returns `None` when the configured name resolves to an empty string.
    pub fn resolve_collection(&self, default: &str) -> Option<String> {
        let name = match &self.collection_name {
            Some(name) => name.resolve(),
            None => default.to_string(),
        };
        (!name.is_empty()).then_some(name)
    }
}

/// Sync settings of a store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Run the sync pipeline after every dispatch
    pub auto_store: bool,
    pub state: SyncTarget,
    pub actions: SyncTarget,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            auto_store: true,
            state: SyncTarget::default(),
            actions: SyncTarget::default(),
        }
    }
}

impl SyncOptions {
    /// Options that never persist automatically
    pub fn none() -> Self {
        Self {
            auto_store: true,
            state: SyncTarget::disabled(),
            actions: SyncTarget::disabled(),
        }
    }

    pub fn state_collection(&self) -> Option<String> {
        self.state.resolve_collection(DEFAULT_STATE_COLLECTION)
    }

    pub fn action_collection(&self) -> Option<String> {
        self.actions.resolve_collection(DEFAULT_ACTION_COLLECTION)
    }
}
