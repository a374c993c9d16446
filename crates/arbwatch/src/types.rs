//! Core data types for firmware descriptors and version history ledgers.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A downloadable firmware build resolved for a device/region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareDescriptor {
    pub url: String,
    pub version: String,
}

/// Whether a ledger entry is the live firmware or a past one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Current,
    Archived,
}

/// One observed firmware build for a device/region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub arb: u32,
    pub major: u32,
    pub minor: u32,
    pub first_seen: NaiveDate,
    pub last_checked: NaiveDate,
    pub status: RecordStatus,
}

/// Parsed output of the firmware analysis step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub version: String,
    pub arb: u32,
    pub major: u32,
    pub minor: u32,
}

impl Observation {
    pub fn new(version: impl Into<String>, arb: u32, major: u32, minor: u32) -> Self {
        Self {
            version: version.into(),
            arb,
            major,
            minor,
        }
    }
}

/// Persisted version history for a single (device_id, region) pair.
///
/// Identity fields are absent on a freshly created ledger and are filled in
/// once, on the first write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub history: Vec<VersionRecord>,
}

impl Ledger {
    /// Create an empty ledger with no identity and no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record currently marked live, if any.
    pub fn current(&self) -> Option<&VersionRecord> {
        self.history
            .iter()
            .find(|r| r.status == RecordStatus::Current)
    }

    /// Look up a record by its version string.
    pub fn get(&self, version: &str) -> Option<&VersionRecord> {
        self.history.iter().find(|r| r.version == version)
    }

    /// Whether the identifying fields have been populated.
    pub fn has_identity(&self) -> bool {
        self.device.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Errors that can occur while locating firmware or maintaining ledgers.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed ledger {}: {source}", .path.display())]
    MalformedLedger {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected upstream response: {0}")]
    Upstream(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type.
pub type TrackerResult<T> = Result<T, TrackerError>;
