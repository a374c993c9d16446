//! `arbwatch update` — fold one analysis result into a ledger file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use arbwatch::{normalize_device_id, AnalysisReport, Observation, Reconciler, UpdateOutcome};

/// Positional values plus an optional analysis result file.
///
/// Values present in the file take precedence over positionals.
#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
    pub device_id: Option<String>,
    pub region: Option<String>,
    pub version: Option<String>,
    pub arb: Option<u32>,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub json_file: Option<PathBuf>,
    pub historical: bool,
}

/// The fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub device_id: String,
    pub region: String,
    pub observation: Observation,
}

impl UpdateArgs {
    pub fn resolve(&self) -> Result<UpdateRequest> {
        let report = match &self.json_file {
            Some(path) => Some(
                AnalysisReport::from_file(path)
                    .with_context(|| format!("Error reading JSON file {}", path.display()))?,
            ),
            None => None,
        };

        let pick = |from_file: Option<&String>, positional: &Option<String>| {
            from_file
                .filter(|v| !v.trim().is_empty())
                .or(positional.as_ref())
                .cloned()
        };

        let device_id = pick(
            report.as_ref().and_then(|r| r.device_short.as_ref()),
            &self.device_id,
        )
        .context("Missing required field: device")?;
        let region = pick(report.as_ref().and_then(|r| r.variant.as_ref()), &self.region)
            .context("Missing required field: region")?;

        let observation = match report {
            Some(mut report) => {
                let blank = report.version.as_deref().map_or(true, |v| v.trim().is_empty());
                if blank {
                    report.version = self.version.clone();
                }
                if report.arb_index.is_none() && report.arb.is_none() {
                    report.arb = self.arb.map(Into::into);
                }
                report.observation()?
            }
            None => {
                let version = self.version.clone().context("Missing required field: version")?;
                let arb = self.arb.context("Missing required field: arb")?;
                Observation::new(version, arb, self.major.unwrap_or(0), self.minor.unwrap_or(0))
            }
        };

        Ok(UpdateRequest {
            device_id: normalize_device_id(&device_id).to_string(),
            region,
            observation,
        })
    }
}

pub fn run<W: Write>(
    reconciler: &Reconciler,
    args: &UpdateArgs,
    out: &mut W,
) -> Result<UpdateOutcome> {
    let request = args.resolve()?;
    let outcome = reconciler.record(
        &request.device_id,
        &request.region,
        &request.observation,
        args.historical,
    )?;

    let version = &request.observation.version;
    if outcome.inserted() {
        writeln!(out, "Added new version: {version}")?;
    } else {
        writeln!(out, "Updated existing version: {version}")?;
    }
    Ok(outcome)
}
