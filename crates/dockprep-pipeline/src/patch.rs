//! Header-record compatibility shim.
//!
//! The docking engine's PDBQT parser rejects `TITLE` and `CRYST1` records
//! that Open Babel carries over into its output. Both are replaced with
//! `REMARK`, which the parser ignores. The substitution targets exactly
//! those two tokens and leaves every other byte unchanged.

use anyhow::Result;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Replace every occurrence of `TITLE` and `CRYST1` with `REMARK`.
pub fn patch_header_records(text: &str) -> String {
    text.replace("TITLE", "REMARK").replace("CRYST1", "REMARK")
}

/// Patch a generated coordinate file in place.
pub async fn patch_file(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).await?;
    fs::write(path, patch_header_records(&text)).await?;
    debug!("Patched header records in {:?}", path);
    Ok(())
}
