//! arbwatch command-line front end.

pub mod commands;
pub mod config;

pub use config::{resolve_device_catalog, resolve_history_dir, resolve_locator_config};
