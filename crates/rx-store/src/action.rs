//! Actions and their detached records
//!
//! An `Action` is a named operation that computes the next state from the
//! current one. `ActionRecord` is the serializable snapshot of an action
//! that callbacks and the sync adapter receive.

use crate::context::StateContext;
use crate::error::ActionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named operation that asynchronously computes and applies the next state
///
/// # Example
///
/// ```rust,ignore
/// struct LoadAction;
///
/// #[async_trait]
/// impl Action<UsersState> for LoadAction {
///     fn action_type(&self) -> &str {
///         "LOAD"
///     }
///
///     async fn execute(&self, ctx: &StateContext<UsersState>) -> Result<UsersState, ActionError> {
///         Ok(ctx.patch_state(&json!({ "loading": false }))?)
///     }
/// }
/// ```
#[async_trait]
pub trait Action<T>: Send + Sync {
    /// The action's type label, e.g. `"LOAD"`
    fn action_type(&self) -> &str;

    /// Optional payload, serialized for callbacks and persistence
    fn payload(&self) -> serde_json::Result<Option<Value>> {
        Ok(None)
    }

    /// Actions returning `true` are never persisted or logged by the sync adapter
    fn never_store_or_log(&self) -> bool {
        false
    }

    /// Compute and apply the next state; the returned value becomes the store state
    async fn execute(&self, ctx: &StateContext<T>) -> Result<T, ActionError>;
}

/// Serializable snapshot of a dispatched action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, rename = "neverStoreOrLog", skip_serializing_if = "is_false")]
    pub never_store_or_log: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ActionRecord {
    /// Record carrying only the type label
    pub fn type_only(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            never_store_or_log: false,
        }
    }

    /// Snapshot an action
    ///
    /// If the payload cannot be serialized the record degrades to the type
    /// label only and a warning is logged.
    pub fn from_action<T>(action: &(impl Action<T> + ?Sized)) -> Self {
        match action.payload() {
            Ok(payload) => Self {
                action_type: action.action_type().to_string(),
                payload,
                never_store_or_log: action.never_store_or_log(),
            },
            Err(e) => {
                log::warn!(
                    "Failed to serialize payload of action '{}', passing type only: {}",
                    action.action_type(),
                    e
                );
                Self {
                    never_store_or_log: action.never_store_or_log(),
                    ..Self::type_only(action.action_type())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Named {
        payload: Option<Value>,
        broken: bool,
    }

    #[async_trait]
    impl Action<u32> for Named {
        fn action_type(&self) -> &str {
            "NAMED"
        }

        fn payload(&self) -> serde_json::Result<Option<Value>> {
            if self.broken {
                return Err(serde_json::Error::custom("cyclic payload"));
            }
            Ok(self.payload.clone())
        }

        async fn execute(&self, ctx: &StateContext<u32>) -> Result<u32, ActionError> {
            Ok(ctx.get_state())
        }
    }

    #[test]
    fn test_record_from_action() {
        let action = Named {
            payload: Some(json!({ "gender": "female" })),
            broken: false,
        };
        let record = ActionRecord::from_action(&action);
        assert_eq!(record.action_type, "NAMED");
        assert_eq!(record.payload, Some(json!({ "gender": "female" })));
        assert!(!record.never_store_or_log);
    }

    #[test]
    fn test_record_degrades_on_payload_error() {
        let action = Named {
            payload: Some(json!(1)),
            broken: true,
        };
        assert_eq!(
            ActionRecord::from_action(&action),
            ActionRecord::type_only("NAMED")
        );
    }

    #[test]
    fn test_record_serialization_uses_type_key() {
        let json = serde_json::to_value(ActionRecord::type_only("LOAD")).unwrap();
        assert_eq!(json, json!({ "type": "LOAD" }));
    }
}
