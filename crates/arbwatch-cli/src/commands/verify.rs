//! `arbwatch verify` — try to resolve every catalog target, one at a time.

use std::io::Write;

use anyhow::Result;

use arbwatch::{DeviceCatalog, FallbackLocator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRow {
    pub name: String,
    pub region: String,
    pub ok: bool,
    pub message: String,
}

/// Resolve each target and print a status table plus a failure summary.
pub async fn run<W: Write>(
    catalog: &DeviceCatalog,
    locator: &FallbackLocator,
    out: &mut W,
) -> Result<Vec<VerifyRow>> {
    writeln!(out, "{:<20} | {:<6} | {:<10} | Result", "Device", "Region", "Status")?;
    writeln!(out, "{}", "-".repeat(60))?;

    let mut rows = Vec::new();
    for (device_id, region) in catalog.targets() {
        let row = match locator.resolve(device_id, region, None).await {
            Some(found) if found.url.starts_with("http") => VerifyRow {
                name: catalog.display_name(device_id),
                region: region.to_string(),
                ok: true,
                message: "URL Found".to_string(),
            },
            Some(found) => VerifyRow {
                name: catalog.display_name(device_id),
                region: region.to_string(),
                ok: false,
                message: format!(
                    "Invalid Output: {}...",
                    found.url.chars().take(30).collect::<String>()
                ),
            },
            None => VerifyRow {
                name: catalog.display_name(device_id),
                region: region.to_string(),
                ok: false,
                message: "Not Found".to_string(),
            },
        };

        let status = if row.ok { "OK" } else { "FAIL" };
        writeln!(out, "{:<20} | {:<6} | {:<10} | {}", row.name, row.region, status, row.message)?;
        rows.push(row);
    }

    writeln!(out, "{}", "-".repeat(60))?;
    let failures: Vec<_> = rows.iter().filter(|r| !r.ok).collect();
    if failures.is_empty() {
        writeln!(out, "\nAll devices passed verification!")?;
    } else {
        writeln!(out, "\nFound {} failures:", failures.len())?;
        for f in &failures {
            writeln!(out, "{} ({}): {}", f.name, f.region, f.message)?;
        }
    }
    Ok(rows)
}
