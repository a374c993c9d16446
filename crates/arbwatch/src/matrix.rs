//! Job matrices for the batch runner: one entry per device/region to check.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::devices::DeviceCatalog;
use crate::locator::ScrapeSource;
use crate::types::TrackerResult;

/// Versions taken per device/region when backfilling.
pub const BACKFILL_DEPTH: usize = 3;

/// Device/region pairs whose upstream lookups currently fail.
pub const DEFAULT_EXCLUSIONS: &[(&str, &str)] = &[
    ("Find X8 Pro", "IN"),
    ("Find X8 Pro", "EU"),
    ("Find X8 Pro", "CN"),
    ("Find X8", "CN"),
    ("Find X8", "IN"),
    ("Find N3", "IN"),
    ("9R", "IN"),
    ("10R", "IN"),
    ("Ace 5 Ultimate", "CN"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub device: String,
    pub variant: String,
    pub device_short: String,
    pub device_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl MatrixEntry {
    fn new(catalog: &DeviceCatalog, device_id: &str, region: &str) -> Self {
        Self {
            device: device_id.to_string(),
            variant: region.to_string(),
            device_short: device_id.to_string(),
            device_name: catalog.display_name(device_id),
            version: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Matrix {
    pub include: Vec<MatrixEntry>,
}

impl Matrix {
    pub fn to_json(&self) -> TrackerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append `matrix=<json>` to a GitHub Actions output file.
    pub fn append_github_output(&self, path: &Path) -> TrackerResult<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "matrix={}", self.to_json()?)?;
        Ok(())
    }
}

/// Every catalog target except the excluded ones.
pub fn live_matrix(catalog: &DeviceCatalog, exclusions: &[(&str, &str)]) -> Matrix {
    let include = catalog
        .targets()
        .into_iter()
        .filter(|target| !exclusions.contains(target))
        .map(|(device_id, region)| MatrixEntry::new(catalog, device_id, region))
        .collect();
    Matrix { include }
}

/// The newest `depth` scraped versions of every catalog target.
///
/// Targets are visited one at a time; a target the scrape source cannot
/// list is skipped.
pub async fn backfill_matrix(
    catalog: &DeviceCatalog,
    scrape: &ScrapeSource,
    depth: usize,
) -> Matrix {
    let mut include = Vec::new();
    for (device_id, region) in catalog.targets() {
        tracing::info!("Checking versions for {device_id} {region}");
        let Some(versions) = scrape.list_versions(device_id, region).await else {
            continue;
        };
        for version in versions.into_iter().take(depth) {
            let mut entry = MatrixEntry::new(catalog, device_id, region);
            entry.version = Some(version);
            include.push(entry);
        }
    }
    Matrix { include }
}
