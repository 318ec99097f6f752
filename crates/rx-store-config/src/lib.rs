//! Configuration and file management for rx-store
//!
//! This crate provides:
//! - Config and data directory paths
//! - Configuration file loading (TOML)
//! - Store configuration (StoreConfig)

pub mod config_file;
pub mod paths;
pub mod store_config;

pub use config_file::load_config_file;
pub use paths::{config_dir, data_dir};
pub use store_config::StoreConfig;
