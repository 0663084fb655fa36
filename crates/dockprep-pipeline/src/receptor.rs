//! Protein isolation and structure repair/protonation via pdb2pqr.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Strip a PDB entry down to its protein component.
///
/// Line-scoped filter: keeps `ATOM`, `TER` and `END` records, drops
/// `HETATM` (ligands, waters, ions), `ANISOU` and everything else. Atoms
/// with an alternate location other than blank or `A` (column 17) are
/// dropped, so each atom appears exactly once in the output.
pub fn isolate_protein(pdb_text: &str) -> String {
    let mut out = String::with_capacity(pdb_text.len());
    for line in pdb_text.lines() {
        let keep = if line.starts_with("ATOM") {
            matches!(line.as_bytes().get(16), None | Some(b' ') | Some(b'A'))
        } else {
            line.starts_with("TER") || line.starts_with("END")
        };
        if keep {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Outputs of a pdb2pqr run: the charge/radius-annotated PQR file and the
/// hydrogen-augmented PDB companion.
#[derive(Debug, Clone)]
pub struct Pdb2PqrOutput {
    pub pqr: PathBuf,
    pub pdb: PathBuf,
}

/// Wrapper for pdb2pqr execution.
pub struct Pdb2PqrRunner {
    executable_path: PathBuf,
    ph: f64,
}

impl Pdb2PqrRunner {
    /// Create a new Pdb2PqrRunner protonating at the given pH.
    pub fn new<P: AsRef<Path>>(executable_path: P, ph: f64) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            ph,
        }
    }

    /// Run pdb2pqr on an isolated protein file, writing the PQR and the
    /// hydrogen-augmented PDB to the given paths.
    pub async fn run(&self, input: &Path, pqr_out: &Path, pdb_out: &Path) -> Result<Pdb2PqrOutput> {
        info!("Running pdb2pqr on {:?} at pH {}", input, self.ph);

        let output = Command::new(&self.executable_path)
            .arg("--ff=AMBER")
            .arg("--with-ph")
            .arg(self.ph.to_string())
            .arg("--pdb-output")
            .arg(pdb_out)
            .arg(input)
            .arg(pqr_out)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pdb2pqr failed: {}", stderr);
        }

        debug!("pdb2pqr completed successfully. Output in {:?}", pqr_out);
        Ok(Pdb2PqrOutput {
            pqr: pqr_out.to_path_buf(),
            pdb: pdb_out.to_path_buf(),
        })
    }
}
