//! PDBQT conversion using Open Babel.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Wrapper for obabel execution.
///
/// obabel reports its "N molecules converted" summary on stderr, so
/// failure is judged by exit status only; stderr text is attached to the
/// error when the tool does fail.
pub struct ObabelRunner {
    executable_path: PathBuf,
}

impl ObabelRunner {
    /// Create a new ObabelRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Convert a charge/radius-annotated PQR receptor into a rigid-receptor
    /// PDBQT (`-xr`: no torsion tree).
    pub async fn receptor_to_pdbqt(&self, pqr: &Path, out: &Path) -> Result<PathBuf> {
        info!("Converting receptor {:?} to PDBQT", pqr);

        let output = Command::new(&self.executable_path)
            .arg(pqr)
            .arg("-O")
            .arg(out)
            .arg("-xr")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("obabel receptor conversion failed: {}", stderr);
        }

        debug!("obabel completed successfully. Output in {:?}", out);
        Ok(out.to_path_buf())
    }

    /// Convert a small-molecule coordinate file into a docking-ready PDBQT,
    /// protonating for the given pH and assigning Gasteiger partial charges.
    pub async fn ligand_to_pdbqt(&self, input: &Path, out: &Path, ph: f64) -> Result<PathBuf> {
        info!("Converting ligand {:?} to PDBQT at pH {}", input, ph);

        let output = Command::new(&self.executable_path)
            .arg(input)
            .arg("-O")
            .arg(out)
            .arg("-p")
            .arg(ph.to_string())
            .arg("--partialcharge")
            .arg("gasteiger")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("obabel ligand conversion failed: {}", stderr);
        }

        debug!("obabel completed successfully. Output in {:?}", out);
        Ok(out.to_path_buf())
    }
}
