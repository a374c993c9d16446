//! `arbwatch parse-ini` — list recent builds for a device/region from an
//! INI history dump as `version|url` lines.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use arbwatch::ini::{ini_section_name, parse_ini_section, DEFAULT_MAX_VERSIONS};
use arbwatch::DeviceCatalog;

pub fn run<W: Write>(
    catalog: &DeviceCatalog,
    ini_file: &Path,
    device_id: &str,
    region: &str,
    out: &mut W,
) -> Result<usize> {
    let bytes = std::fs::read(ini_file)
        .with_context(|| format!("Error reading file {}", ini_file.display()))?;
    let content = String::from_utf8_lossy(&bytes);

    let section = ini_section_name(catalog, device_id, region);
    let builds = parse_ini_section(&content, &section, DEFAULT_MAX_VERSIONS);
    tracing::debug!("Section [{section}] yielded {} builds", builds.len());

    for build in &builds {
        writeln!(out, "{}|{}", build.version, build.url)?;
    }
    Ok(builds.len())
}
