//! Wires observed firmware facts into on-disk ledgers.
//!
//! The [`Reconciler`] is the only writer of ledger files. Each call is a
//! whole-file load, transition, save; one writer per file is assumed.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::devices::DeviceCatalog;
use crate::ledger::{self, UpdateOutcome};
use crate::types::{Ledger, Observation, TrackerError, TrackerResult};

pub const DEFAULT_HISTORY_DIR: &str = "data/history";

pub struct Reconciler {
    history_dir: PathBuf,
    catalog: Arc<DeviceCatalog>,
}

impl Reconciler {
    pub fn new(history_dir: impl Into<PathBuf>, catalog: Arc<DeviceCatalog>) -> Self {
        Self {
            history_dir: history_dir.into(),
            catalog,
        }
    }

    /// `{history_dir}/{device_id}_{region}.json`
    ///
    /// Both parts must be plain file-name components so the ledger stays
    /// inside the history directory.
    pub fn ledger_path(&self, device_id: &str, region: &str) -> TrackerResult<PathBuf> {
        for part in [device_id, region] {
            if !is_plain_name(part) {
                return Err(TrackerError::InvalidInput(format!(
                    "{part:?} is not a usable device id or region"
                )));
            }
        }
        Ok(self.history_dir.join(format!("{device_id}_{region}.json")))
    }

    /// Record an observation dated today (local time).
    pub fn record(
        &self,
        device_id: &str,
        region: &str,
        obs: &Observation,
        historical: bool,
    ) -> TrackerResult<UpdateOutcome> {
        let today = chrono::Local::now().date_naive();
        self.record_on(device_id, region, obs, historical, today)
    }

    /// Record an observation with an explicit date.
    pub fn record_on(
        &self,
        device_id: &str,
        region: &str,
        obs: &Observation,
        historical: bool,
        today: NaiveDate,
    ) -> TrackerResult<UpdateOutcome> {
        let path = self.ledger_path(device_id, region)?;
        if obs.version.trim().is_empty() {
            return Err(TrackerError::InvalidInput("version is required".into()));
        }

        let mut ledger = ledger::load(&path)?;
        self.stamp_identity(&mut ledger, device_id, region);

        let outcome = ledger::update(&mut ledger, obs, historical, today);
        ledger::save(&path, &ledger)?;

        match outcome {
            UpdateOutcome::Inserted => {
                tracing::info!("{device_id} {region}: new current version {}", obs.version)
            }
            UpdateOutcome::Promoted => {
                tracing::info!("{device_id} {region}: promoted {} to current", obs.version)
            }
            UpdateOutcome::Backfilled => {
                tracing::info!("{device_id} {region}: backfilled {}", obs.version)
            }
            UpdateOutcome::Refreshed => {
                tracing::debug!("{device_id} {region}: refreshed {}", obs.version)
            }
        }
        Ok(outcome)
    }

    /// Load the ledger for a device/region without modifying it.
    pub fn ledger(&self, device_id: &str, region: &str) -> TrackerResult<Ledger> {
        ledger::load(&self.ledger_path(device_id, region)?)
    }

    fn stamp_identity(&self, ledger: &mut Ledger, device_id: &str, region: &str) {
        if ledger.has_identity() {
            return;
        }
        ledger.device = Some(self.catalog.display_name(device_id));
        ledger.device_id = Some(device_id.to_string());
        ledger.region = Some(region.to_string());
        ledger.model = Some(self.catalog.model_number(device_id, region));
    }
}

/// A single file-name component: no separators, no `.`/`..`.
fn is_plain_name(part: &str) -> bool {
    !part.is_empty()
        && part != "."
        && part != ".."
        && !part.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn reconciler(dir: &tempfile::TempDir) -> Reconciler {
        Reconciler::new(dir.path().join("history"), Arc::new(DeviceCatalog::builtin()))
    }

    #[test]
    fn test_ledger_path() {
        let r = Reconciler::new("data/history", Arc::new(DeviceCatalog::builtin()));
        assert_eq!(
            r.ledger_path("10 Pro", "EU").unwrap(),
            PathBuf::from("data/history/10 Pro_EU.json")
        );
    }

    #[test]
    fn test_first_write_stamps_identity() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);

        let outcome = r
            .record_on("15", "IN", &Observation::new("V1", 0, 3, 0), false, day(1))
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Inserted);

        let ledger = r.ledger("15", "IN").unwrap();
        assert_eq!(ledger.device.as_deref(), Some("OnePlus 15"));
        assert_eq!(ledger.device_id.as_deref(), Some("15"));
        assert_eq!(ledger.region.as_deref(), Some("IN"));
        assert_eq!(ledger.model.as_deref(), Some("CPH2745"));
    }

    #[test]
    fn test_identity_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);
        let path = r.ledger_path("15", "GLO").unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"device": "Custom Name", "device_id": "15", "region": "GLO", "model": "X", "history": []}"#,
        )
        .unwrap();

        r.record_on("15", "GLO", &Observation::new("V1", 0, 3, 0), false, day(1))
            .unwrap();
        let ledger = r.ledger("15", "GLO").unwrap();
        assert_eq!(ledger.device.as_deref(), Some("Custom Name"));
        assert_eq!(ledger.model.as_deref(), Some("X"));
    }

    #[test]
    fn test_sequence_persists_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);

        r.record_on("13", "EU", &Observation::new("v1", 0, 3, 0), false, day(1)).unwrap();
        r.record_on("13", "EU", &Observation::new("v2", 1, 3, 0), false, day(2)).unwrap();
        r.record_on("13", "EU", &Observation::new("v0", 0, 2, 0), true, day(3)).unwrap();
        let outcome = r
            .record_on("13", "EU", &Observation::new("v1", 0, 3, 0), false, day(4))
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Promoted);

        let ledger = r.ledger("13", "EU").unwrap();
        let versions: Vec<_> = ledger
            .history
            .iter()
            .map(|e| (e.version.as_str(), e.status))
            .collect();
        assert_eq!(
            versions,
            vec![
                ("v1", RecordStatus::Current),
                ("v2", RecordStatus::Archived),
                ("v0", RecordStatus::Archived),
            ]
        );
    }

    #[test]
    fn test_malformed_ledger_is_surfaced_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);
        let path = r.ledger_path("12", "CN").unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = r
            .record_on("12", "CN", &Observation::new("V1", 0, 3, 0), false, day(1))
            .unwrap_err();
        assert!(matches!(err, TrackerError::MalformedLedger { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn test_path_like_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);
        let obs = Observation::new("V1", 0, 3, 0);

        let bad = [("../x", "GLO"), ("15", "../../etc"), ("..", "EU"), ("a\\b", "IN"), ("", "EU")];
        for (device_id, region) in bad {
            let err = r.record_on(device_id, region, &obs, false, day(1)).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidInput(_)), "{device_id} {region}");
            assert!(r.ledger(device_id, region).is_err());
        }
        assert!(!dir.path().join("x_GLO.json").exists());
        assert!(!dir.path().join("history").exists());

        // Spaces are ordinary catalog ids.
        r.record_on("10 Pro", "EU", &obs, false, day(1)).unwrap();
    }

    #[test]
    fn test_missing_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let r = reconciler(&dir);
        let err = r
            .record_on("12", "CN", &Observation::new("", 0, 3, 0), false, day(1))
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(!r.ledger_path("12", "CN").unwrap().exists());
    }
}
