//! `arbwatch fetch` — resolve a firmware download for one device/region.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use arbwatch::{FallbackLocator, FirmwareDescriptor};

/// What to print once a build is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Url,
    Version,
    Json,
}

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub device_id: String,
    pub region: String,
    pub version: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Resolve and report. A miss on every source is an error.
pub async fn run<W: Write>(
    locator: &FallbackLocator,
    args: &FetchArgs,
    out: &mut W,
) -> Result<FirmwareDescriptor> {
    let found = locator
        .resolve(&args.device_id, &args.region, args.version.as_deref())
        .await
        .with_context(|| match &args.version {
            Some(v) => format!(
                "No firmware found for {} {} version {v}",
                args.device_id, args.region
            ),
            None => format!("No firmware found for {} {}", args.device_id, args.region),
        })?;

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&found)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote descriptor to {}", path.display());
        return Ok(found);
    }

    match args.format {
        OutputFormat::Url => writeln!(out, "{}", found.url)?,
        OutputFormat::Version => writeln!(out, "{}", found.version)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&found)?)?,
    }
    Ok(found)
}
