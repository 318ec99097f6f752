//! Actions of the users demo

use crate::state::{Gender, User, UsersState};
use async_trait::async_trait;
use rx_store::{Action, ActionError, StateContext};
use serde_json::{json, Value};

/// Store context key of the `UserDirectory`
pub const USER_DIRECTORY: &str = "users";

/// Source of users for `LoadAction`
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn sample() -> Self {
        Self::new(vec![
            User::new("Ada Lovelace", "ada@example.com", Gender::Female),
            User::new("Alan Turing", "alan@example.com", Gender::Male),
            User::new("Grace Hopper", "grace@example.com", Gender::Female),
            User::new("Sam Rivera", "sam@example.com", Gender::Other),
            User::new("Ken Thompson", "ken@example.com", Gender::Male),
        ])
    }

    pub async fn fetch(&self) -> Vec<User> {
        tokio::task::yield_now().await;
        self.users.clone()
    }
}

/// Load users once; a restored or already loaded list is kept
pub struct LoadAction;

#[async_trait]
impl Action<UsersState> for LoadAction {
    fn action_type(&self) -> &str {
        "LOAD"
    }

    async fn execute(&self, ctx: &StateContext<UsersState>) -> Result<UsersState, ActionError> {
        if !ctx.get_state().users.is_empty() {
            return Ok(ctx.patch_state(&json!({ "loading": false }))?);
        }

        ctx.patch_state(&json!({ "loading": true }))?;
        let directory = ctx
            .get_context::<UserDirectory>(USER_DIRECTORY)
            .ok_or_else(|| ActionError::msg("no user directory in store context"))?;
        let users = directory.fetch().await;
        log::info!("Loaded {} users", users.len());

        Ok(ctx.patch_state(&json!({ "loading": false, "users": users }))?)
    }
}

pub struct FilterAction {
    pub gender: Gender,
}

#[async_trait]
impl Action<UsersState> for FilterAction {
    fn action_type(&self) -> &str {
        "FILTER"
    }

    fn payload(&self) -> serde_json::Result<Option<Value>> {
        Ok(Some(json!({ "gender": self.gender })))
    }

    async fn execute(&self, ctx: &StateContext<UsersState>) -> Result<UsersState, ActionError> {
        Ok(ctx.update_state(|state| state.gender_filter = self.gender))
    }
}

pub struct ClearFilterAction;

#[async_trait]
impl Action<UsersState> for ClearFilterAction {
    fn action_type(&self) -> &str {
        "FILTER_CLEAR"
    }

    async fn execute(&self, ctx: &StateContext<UsersState>) -> Result<UsersState, ActionError> {
        Ok(ctx.update_state(|state| state.gender_filter = Gender::None))
    }
}
