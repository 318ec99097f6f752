use anyhow::Context;
use std::sync::Arc;

mod actions;
mod state;

use actions::{ClearFilterAction, FilterAction, LoadAction, UserDirectory, USER_DIRECTORY};
use rx_store::Store;
use rx_store_config::StoreConfig;
use rx_store_fs::{FsDataApi, DEFAULT_USER};
use state::{Gender, UsersState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting rx-store-demo");

    let config = StoreConfig::load();
    let data_dir = config
        .resolved_data_dir()
        .context("Failed to resolve data directory")?;
    log::info!("Persisting documents in {}", data_dir.display());

    let user_id = config.user_id.clone().unwrap_or_else(|| {
        log::info!("No user_id configured, using '{}'", DEFAULT_USER);
        DEFAULT_USER.to_string()
    });
    let api = Arc::new(FsDataApi::new(data_dir, Some(user_id)));
    let store = Store::builder(UsersState::default())
        .dev_tools(config.dev_tools)
        .data_api(api)
        .sync_options(config.sync.clone())
        .dependency(USER_DIRECTORY, UserDirectory::sample())
        .build();

    let _worker = store.spawn_worker();
    let _subscription = store.subscribe(|state: &UsersState| {
        log::debug!(
            "State changed: loading={}, users={}, filter={:?}",
            state.loading,
            state.users.len(),
            state.gender_filter
        );
    });

    let restored = store.restore_state().await;
    log::info!("Restored {} users", restored.users.len());

    store.dispatch(LoadAction).await?;
    print_users("All users", &store.current_state());

    let state = store
        .dispatch(FilterAction {
            gender: Gender::Female,
        })
        .await?;
    print_users("Female users", &state);

    let state = store.dispatch(ClearFilterAction).await?;
    print_users("Filter cleared", &state);

    log::info!("Exiting rx-store-demo");
    Ok(())
}

fn print_users(title: &str, state: &UsersState) {
    println!("{} ({:?}):", title, state.gender_filter);
    for user in state.visible_users() {
        println!("  {:<16} {:<22} {:?}", user.name, user.email, user.gender);
    }
}
