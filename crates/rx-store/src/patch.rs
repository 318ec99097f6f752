//! Shallow merge of a partial state into a full state
//!
//! Both sides are serialized to JSON objects; top-level keys of the partial
//! override those of the current state. Anything `Serialize` can act as a
//! partial: a `serde_json::json!` object, or a struct whose optional fields
//! use `skip_serializing_if = "Option::is_none"`.

use crate::error::PatchError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Merge `partial` over `current` and return the resulting state
///
/// A `null` partial or an empty object yields a value equal to `current`.
pub fn shallow_merge<T, P>(current: &T, partial: &P) -> Result<T, PatchError>
where
    T: Serialize + DeserializeOwned,
    P: Serialize + ?Sized,
{
    let mut base = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => return Err(PatchError::NotAnObject("state")),
    };

    match serde_json::to_value(partial)? {
        Value::Object(overrides) => base.extend(overrides),
        Value::Null => {}
        _ => return Err(PatchError::NotAnObject("partial")),
    }

    Ok(serde_json::from_value(Value::Object(base))?)
}
