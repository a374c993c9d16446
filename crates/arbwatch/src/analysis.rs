//! Intake for the analysis step's result file.
//!
//! The extraction tooling writes a loose JSON object; keys and value types
//! vary between tool versions, so numeric fields are accepted either as
//! numbers or as numeric strings.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Observation, TrackerError, TrackerResult};

/// Raw analysis result as written by the extraction tooling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub device_short: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub arb_index: Option<Value>,
    #[serde(default)]
    pub arb: Option<Value>,
    #[serde(default)]
    pub major: Option<Value>,
    #[serde(default)]
    pub minor: Option<Value>,
}

impl AnalysisReport {
    pub fn from_file(path: &Path) -> TrackerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Convert to an observation. `arb_index` wins over `arb`; missing
    /// `major`/`minor` default to 0; a missing version or ARB is an error.
    pub fn observation(&self) -> TrackerResult<Observation> {
        let version = self
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TrackerError::InvalidInput("analysis result has no version".into()))?;

        let arb = match (&self.arb_index, &self.arb) {
            (Some(v), _) if !v.is_null() => as_count("arb_index", v)?,
            (_, Some(v)) if !v.is_null() => as_count("arb", v)?,
            _ => {
                return Err(TrackerError::InvalidInput(
                    "analysis result has no arb_index".into(),
                ))
            }
        };

        let major = self.major.as_ref().map(|v| as_count("major", v)).transpose()?;
        let minor = self.minor.as_ref().map(|v| as_count("minor", v)).transpose()?;

        Ok(Observation::new(
            version,
            arb,
            major.unwrap_or(0),
            minor.unwrap_or(0),
        ))
    }
}

fn as_count(field: &str, value: &Value) -> TrackerResult<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Null => Some(0),
        _ => None,
    };
    parsed.ok_or_else(|| TrackerError::InvalidInput(format!("{field} is not a count: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> AnalysisReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_report() {
        let r = report(
            r#"{"device_short": "15", "variant": "GLO", "version": "V1", "arb_index": 1, "major": 3, "minor": 0}"#,
        );
        assert_eq!(r.observation().unwrap(), Observation::new("V1", 1, 3, 0));
        assert_eq!(r.device_short.as_deref(), Some("15"));
    }

    #[test]
    fn test_arb_fallback_and_string_numbers() {
        let r = report(r#"{"version": "V1", "arb": "2", "major": "4"}"#);
        assert_eq!(r.observation().unwrap(), Observation::new("V1", 2, 4, 0));
    }

    #[test]
    fn test_arb_zero_is_present() {
        let r = report(r#"{"version": "V1", "arb_index": 0}"#);
        assert_eq!(r.observation().unwrap().arb, 0);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(report(r#"{"arb_index": 1}"#).observation().is_err());
        assert!(report(r#"{"version": "V1"}"#).observation().is_err());
        assert!(report(r#"{"version": "  ", "arb": 1}"#).observation().is_err());
    }

    #[test]
    fn test_negative_arb_rejected() {
        let r = report(r#"{"version": "V1", "arb_index": -1}"#);
        assert!(matches!(r.observation(), Err(TrackerError::InvalidInput(_))));
    }
}
