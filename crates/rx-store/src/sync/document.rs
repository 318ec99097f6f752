//! Building persisted documents from state values and action records

use super::data_api::Document;
use super::options::SyncTarget;
use crate::action::ActionRecord;
use crate::error::SyncError;
use crate::utils::now_millis;
use serde::Serialize;
use serde_json::Value;

pub const CREATED_BY: &str = "createdBy";
pub const TIME: &str = "time";

/// Serialize a state value into its persisted document
///
/// With `add_user_id` set, a missing user is `SyncError::NotLoggedIn` and
/// nothing should be written.
pub fn state_document<T: Serialize + ?Sized>(
    state: &T,
    target: &SyncTarget,
    user_id: Option<&str>,
) -> Result<Document, SyncError> {
    let mut document = into_document(serde_json::to_value(state)?, "state")?;
    if target.add_user_id {
        let id = user_id.ok_or(SyncError::NotLoggedIn)?;
        document.insert(CREATED_BY.to_string(), Value::from(id));
    }
    remove_excluded(&mut document, target);
    Ok(document)
}

/// Build the persisted document for a dispatched action
///
/// Adds `time` (epoch millis) unless the record already carries one.
/// `createdBy` is set after excluded fields are removed, so it survives
/// an exclusion. Without a user the action is still stored, unattributed.
pub fn action_document(
    record: &ActionRecord,
    target: &SyncTarget,
    user_id: Option<&str>,
) -> Result<Document, SyncError> {
    let mut document = into_document(serde_json::to_value(record)?, "action")?;
    if !document.contains_key(TIME) {
        document.insert(TIME.to_string(), Value::from(now_millis()));
    }
    remove_excluded(&mut document, target);
    if target.add_user_id {
        match user_id {
            Some(id) => {
                document.insert(CREATED_BY.to_string(), Value::from(id));
            }
            None => log::error!("Cannot add user id to action: no user is logged in"),
        }
    }
    Ok(document)
}

fn into_document(value: Value, kind: &'static str) -> Result<Document, SyncError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SyncError::NotADocument(kind)),
    }
}

fn remove_excluded(document: &mut Document, target: &SyncTarget) {
    for field in &target.excluded_fields {
        document.remove(field);
    }
}
