//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit flag, then environment variable,
//! then built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use arbwatch::reconcile::DEFAULT_HISTORY_DIR;
use arbwatch::{DeviceCatalog, LocatorConfig};

pub const ENV_HISTORY_DIR: &str = "ARBWATCH_HISTORY_DIR";
pub const ENV_DEVICES: &str = "ARBWATCH_DEVICES";
pub const ENV_API_URL: &str = "ARBWATCH_API_URL";
pub const ENV_SCRAPE_URL: &str = "ARBWATCH_SCRAPE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ARBWATCH_TIMEOUT_SECS";

/// Network settings as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct NetworkOverrides {
    pub api_url: Option<String>,
    pub scrape_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn explicit_or_env(explicit: Option<&str>, var: &str) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

/// Resolve the directory holding ledger files.
pub fn resolve_history_dir(explicit: Option<&str>) -> PathBuf {
    explicit_or_env(explicit, ENV_HISTORY_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_DIR))
}

/// Resolve the device catalog: a JSON file if one is configured, else built-in.
pub fn resolve_device_catalog(explicit: Option<&str>) -> Result<DeviceCatalog> {
    match explicit_or_env(explicit, ENV_DEVICES) {
        Some(path) => DeviceCatalog::from_file(Path::new(&path))
            .with_context(|| format!("Failed to load device catalog {path}")),
        None => Ok(DeviceCatalog::builtin()),
    }
}

/// Resolve upstream endpoints and timeout.
pub fn resolve_locator_config(overrides: &NetworkOverrides) -> Result<LocatorConfig> {
    let mut config = LocatorConfig::default();

    if let Some(url) = explicit_or_env(overrides.api_url.as_deref(), ENV_API_URL) {
        config.api_base = url;
    }
    if let Some(url) = explicit_or_env(overrides.scrape_url.as_deref(), ENV_SCRAPE_URL) {
        config.scrape_url = url;
    }

    let timeout_secs = match overrides.timeout_secs {
        Some(secs) => Some(secs),
        None => match std::env::var(ENV_TIMEOUT_SECS) {
            Ok(raw) if !raw.is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))?,
            ),
            _ => None,
        },
    };
    if let Some(secs) = timeout_secs {
        anyhow::ensure!(secs > 0, "timeout must be at least one second");
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}
