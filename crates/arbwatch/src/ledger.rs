//! Per-device/region version history: the insert/promote/refresh rules and
//! the JSON file round-trip.
//!
//! [`apply`] is a pure transition over an owned [`Ledger`]; nothing here
//! touches the clock or the filesystem except [`load`] and [`save`].

use std::path::Path;

use chrono::NaiveDate;

use crate::types::{
    Ledger, Observation, RecordStatus, TrackerError, TrackerResult, VersionRecord,
};

/// What an update did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New version recorded as current.
    Inserted,
    /// Known archived version became current again.
    Promoted,
    /// Known version; only `last_checked` moved.
    Refreshed,
    /// New version appended as archived history.
    Backfilled,
}

impl UpdateOutcome {
    /// True when the live state of the ledger changed.
    pub fn inserted(self) -> bool {
        matches!(self, UpdateOutcome::Inserted | UpdateOutcome::Promoted)
    }
}

/// Fold one observation into a ledger.
///
/// Live observations always leave exactly one current record: the observed
/// version, at the front. Historical observations only ever add archived
/// entries at the back or refresh timestamps; they never change which
/// record is current.
pub fn apply(
    mut ledger: Ledger,
    obs: &Observation,
    historical: bool,
    today: NaiveDate,
) -> (Ledger, UpdateOutcome) {
    if let Some(idx) = ledger.history.iter().position(|r| r.version == obs.version) {
        ledger.history[idx].last_checked = today;

        if historical || ledger.history[idx].status == RecordStatus::Current {
            return (ledger, UpdateOutcome::Refreshed);
        }

        let mut promoted = ledger.history.remove(idx);
        archive_all(&mut ledger.history);
        promoted.status = RecordStatus::Current;
        ledger.history.insert(0, promoted);
        return (ledger, UpdateOutcome::Promoted);
    }

    let mut record = VersionRecord {
        version: obs.version.clone(),
        arb: obs.arb,
        major: obs.major,
        minor: obs.minor,
        first_seen: today,
        last_checked: today,
        status: RecordStatus::Archived,
    };

    if historical {
        ledger.history.push(record);
        return (ledger, UpdateOutcome::Backfilled);
    }

    archive_all(&mut ledger.history);
    record.status = RecordStatus::Current;
    ledger.history.insert(0, record);
    (ledger, UpdateOutcome::Inserted)
}

/// In-place form of [`apply`].
pub fn update(
    ledger: &mut Ledger,
    obs: &Observation,
    historical: bool,
    today: NaiveDate,
) -> UpdateOutcome {
    let (next, outcome) = apply(std::mem::take(ledger), obs, historical, today);
    *ledger = next;
    outcome
}

fn archive_all(history: &mut [VersionRecord]) {
    for record in history {
        record.status = RecordStatus::Archived;
    }
}

/// Read a ledger file. A missing file is an empty ledger; a malformed one
/// is an error and is never silently replaced.
pub fn load(path: &Path) -> TrackerResult<Ledger> {
    if !path.exists() {
        return Ok(Ledger::new());
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| TrackerError::MalformedLedger {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a ledger file, creating parent directories as needed.
pub fn save(path: &Path, ledger: &Ledger) -> TrackerResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn obs(version: &str, arb: u32) -> Observation {
        Observation::new(version, arb, 3, 0)
    }

    fn shape(ledger: &Ledger) -> Vec<(&str, RecordStatus)> {
        ledger
            .history
            .iter()
            .map(|r| (r.version.as_str(), r.status))
            .collect()
    }

    fn current_count(ledger: &Ledger) -> usize {
        ledger
            .history
            .iter()
            .filter(|r| r.status == RecordStatus::Current)
            .count()
    }

    use RecordStatus::{Archived, Current};

    #[test]
    fn test_insert_promote_scenario() {
        let mut ledger = Ledger::new();

        assert_eq!(update(&mut ledger, &obs("v1", 0), false, day(1)), UpdateOutcome::Inserted);
        assert_eq!(shape(&ledger), vec![("v1", Current)]);

        assert_eq!(update(&mut ledger, &obs("v2", 1), false, day(2)), UpdateOutcome::Inserted);
        assert_eq!(shape(&ledger), vec![("v2", Current), ("v1", Archived)]);

        assert_eq!(update(&mut ledger, &obs("v1", 0), false, day(3)), UpdateOutcome::Promoted);
        assert_eq!(shape(&ledger), vec![("v1", Current), ("v2", Archived)]);
        assert_eq!(ledger.history[0].first_seen, day(1));
        assert_eq!(ledger.history[0].last_checked, day(3));
    }

    #[test]
    fn test_live_repeat_is_idempotent() {
        let mut ledger = Ledger::new();
        update(&mut ledger, &obs("v1", 0), false, day(1));
        update(&mut ledger, &obs("v2", 0), false, day(2));
        let before: Vec<_> = shape(&ledger)
            .into_iter()
            .map(|(v, s)| (v.to_string(), s))
            .collect();

        let outcome = update(&mut ledger, &obs("v2", 0), false, day(9));
        assert_eq!(outcome, UpdateOutcome::Refreshed);
        assert!(!outcome.inserted());
        let after: Vec<_> = shape(&ledger)
            .into_iter()
            .map(|(v, s)| (v.to_string(), s))
            .collect();
        assert_eq!(before, after);
        assert_eq!(ledger.history[0].last_checked, day(9));
        assert_eq!(ledger.history[0].first_seen, day(2));
    }

    #[test]
    fn test_historical_new_version_appends_archived() {
        let mut ledger = Ledger::new();
        update(&mut ledger, &obs("live", 1), false, day(1));

        let outcome = update(&mut ledger, &obs("old", 0), true, day(2));
        assert_eq!(outcome, UpdateOutcome::Backfilled);
        assert!(!outcome.inserted());
        assert_eq!(shape(&ledger), vec![("live", Current), ("old", Archived)]);
        assert_eq!(ledger.current().unwrap().version, "live");
    }

    #[test]
    fn test_historical_never_promotes() {
        let mut ledger = Ledger::new();
        update(&mut ledger, &obs("v1", 0), false, day(1));
        update(&mut ledger, &obs("v2", 0), false, day(2));

        let outcome = update(&mut ledger, &obs("v1", 0), true, day(3));
        assert_eq!(outcome, UpdateOutcome::Refreshed);
        assert_eq!(shape(&ledger), vec![("v2", Current), ("v1", Archived)]);
        assert_eq!(ledger.history[1].last_checked, day(3));
    }

    #[test]
    fn test_historical_on_fresh_ledger_leaves_no_current() {
        let mut ledger = Ledger::new();
        update(&mut ledger, &obs("a", 0), true, day(1));
        update(&mut ledger, &obs("b", 0), true, day(1));
        assert_eq!(shape(&ledger), vec![("a", Archived), ("b", Archived)]);
        assert!(ledger.current().is_none());
    }

    #[test]
    fn test_existing_record_values_are_not_overwritten() {
        let mut ledger = Ledger::new();
        update(&mut ledger, &obs("v1", 0), false, day(1));
        update(&mut ledger, &obs("v1", 7), false, day(2));
        assert_eq!(ledger.history[0].arb, 0);
    }

    #[test]
    fn test_at_most_one_current_over_mixed_sequence() {
        let steps: &[(&str, bool)] = &[
            ("a", true),
            ("b", false),
            ("c", true),
            ("a", false),
            ("c", false),
            ("b", true),
            ("d", false),
            ("a", false),
            ("a", false),
        ];
        let mut ledger = Ledger::new();
        for (i, (version, historical)) in steps.iter().enumerate() {
            let before = ledger.current().map(|r| r.version.clone());
            update(&mut ledger, &obs(version, 0), *historical, day(1 + i as u32));

            assert!(current_count(&ledger) <= 1);
            if *historical {
                assert_eq!(ledger.current().map(|r| r.version.clone()), before);
            } else {
                assert_eq!(current_count(&ledger), 1);
                assert_eq!(ledger.history[0].version, *version);
                assert_eq!(ledger.history[0].status, Current);
            }
        }
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn test_apply_is_pure_over_input() {
        let original = Ledger::new();
        let (next, outcome) = apply(original.clone(), &obs("v1", 0), false, day(1));
        assert!(original.is_empty());
        assert_eq!(next.len(), 1);
        assert!(outcome.inserted());
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = load(&dir.path().join("absent.json")).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.has_identity());
    }

    #[test]
    fn test_load_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"history\": [").unwrap();
        assert!(matches!(load(&path), Err(TrackerError::MalformedLedger { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"history\": [");
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("15_GLO.json");

        let mut ledger = Ledger::new();
        ledger.device = Some("OnePlus 15".to_string());
        update(&mut ledger, &obs("v1", 0), false, day(1));
        save(&path, &ledger).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, ledger);

        let text = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["history"][0]["status"], "current");
        assert_eq!(raw["history"][0]["first_seen"], "2025-03-01");
    }
}
