//! Store configuration
//!
//! Configuration loaded from `.rx-store.toml`.
//!
//! ```toml
//! dev_tools = true
//! user_id = "user-123"
//!
//! [sync]
//! auto_store = true
//!
//! [sync.state]
//! collection_name = "profiles"
//! excluded_fields = ["token"]
//!
//! [sync.actions]
//! sync = false
//! ```

use rx_store::SyncOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Store configuration loaded from `.rx-store.toml`
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Forward every dispatch to the dev tools log target
    pub dev_tools: bool,

    /// User id stamped on persisted documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Root directory for persisted documents (default: platform data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// What to persist, and where
    pub sync: SyncOptions,
}

impl StoreConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        match crate::load_config_file() {
            Some(content) => Self::parse(&content),
            None => {
                log::debug!("Using default store config");
                Self::default()
            }
        }
    }

    /// Parse config content, falling back to defaults on error
    pub fn parse(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                log::info!("Loaded store config from file");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    /// Directory documents are persisted in
    ///
    /// Prefers the configured `data_dir`, then the platform data directory.
    pub fn resolved_data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => crate::paths::data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(!config.dev_tools);
        assert!(config.user_id.is_none());
        assert!(config.sync.auto_store);
        assert!(config.sync.state.sync);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            dev_tools = true
            user_id = "user-123"

            [sync.state]
            collection_name = "profiles"
            add_user_id = false

            [sync.actions]
            sync = false
        "#;
        let config = StoreConfig::parse(toml);
        assert!(config.dev_tools);
        assert_eq!(config.user_id.as_deref(), Some("user-123"));
        assert_eq!(config.sync.state_collection().as_deref(), Some("profiles"));
        assert!(!config.sync.state.add_user_id);
        assert!(!config.sync.actions.sync);
        // Untouched fields keep defaults
        assert!(config.sync.auto_store);
        assert_eq!(config.sync.action_collection().as_deref(), Some("actions"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let config = StoreConfig::parse("dev_tools = \"yes please\"");
        assert!(!config.dev_tools);
    }

    #[test]
    fn test_configured_data_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            data_dir: Some(dir.path().join("documents")),
            ..StoreConfig::default()
        };
        let resolved = config.resolved_data_dir().unwrap();
        assert!(resolved.exists());
        assert!(resolved.ends_with("documents"));
    }
}
