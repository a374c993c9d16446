//! `arbwatch matrix` / `arbwatch backfill-matrix` — emit batch job lists.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use arbwatch::matrix::Matrix;

pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Print the matrix, or append it to the Actions output file when given.
pub fn emit<W: Write>(matrix: &Matrix, github_output: Option<&Path>, out: &mut W) -> Result<()> {
    match github_output {
        Some(path) => {
            matrix.append_github_output(path)?;
            tracing::info!("Appended {} entries to {}", matrix.include.len(), path.display());
        }
        None => writeln!(out, "{}", matrix.to_json()?)?,
    }
    Ok(())
}
