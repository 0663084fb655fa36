//! Orchestrator for the retrieval and docking-preparation pipeline.
//!
//! Each stage takes its inputs as explicit arguments and returns explicit
//! outputs (identifier lists, paths); no ambient state crosses stage
//! boundaries. Stages run strictly sequentially and the first failure
//! aborts the run. Partial output directories hold individually complete
//! files, and a re-run overwrites them, so resuming is just running again.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use dockprep_common::{LigandId, StructureId};
use dockprep_search::{Query, ReturnType, SearchClient};

use crate::fetch::ArtifactFetcher;
use crate::ligand::ObabelRunner;
use crate::patch;
use crate::receptor::{isolate_protein, Pdb2PqrRunner};

/// Two projections of one structural population: the matching entries and
/// the chemical components they bind.
#[derive(Debug)]
pub struct Survey {
    pub entries: Vec<StructureId>,
    pub ligands: Vec<LigandId>,
}

/// The docking-ready pair produced by `prepare`.
#[derive(Debug)]
pub struct PreparedPair {
    pub receptor_pdbqt: PathBuf,
    pub ligand_pdbqt: PathBuf,
}

/// Directory layout for staged artifacts.
#[derive(Debug, Clone)]
pub struct StagingDirs {
    pub ligands: PathBuf,
    pub structures: PathBuf,
    pub pdbqt: PathBuf,
}

pub struct PrepPipeline {
    search: SearchClient,
    fetcher: ArtifactFetcher,
    pdb2pqr: Pdb2PqrRunner,
    obabel: ObabelRunner,
    dirs: StagingDirs,
    ph: f64,
}

impl PrepPipeline {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        dirs: StagingDirs,
        pdb2pqr_path: P,
        obabel_path: Q,
        ph: f64,
    ) -> Result<Self> {
        Ok(Self {
            search: SearchClient::new()?,
            fetcher: ArtifactFetcher::new()?,
            pdb2pqr: Pdb2PqrRunner::new(pdb2pqr_path, ph),
            obabel: ObabelRunner::new(obabel_path),
            dirs,
            ph,
        })
    }

    /// Submit the query under both projections. The identical predicate set
    /// is used for both calls, so the entry codes and ligand codes describe
    /// the same structural population.
    pub async fn survey(&self, query: &Query) -> Result<Survey> {
        let entries = self.search.search(query, ReturnType::Entry).await?;
        let ligands = self.search.search(query, ReturnType::MolDefinition).await?;

        let entries: Vec<StructureId> = entries
            .iter()
            .map(|id| StructureId::new(id))
            .collect::<Result<_, _>>()?;
        let ligands: Vec<LigandId> = ligands
            .iter()
            .map(|id| LigandId::new(id))
            .collect::<Result<_, _>>()?;

        info!(
            "Survey matched {} entries and {} distinct ligands",
            entries.len(),
            ligands.len()
        );
        Ok(Survey { entries, ligands })
    }

    /// Batch-fetch ideal-coordinate SDFs into the ligand staging directory.
    pub async fn stage_ligands(&self, ids: &[LigandId]) -> Result<Vec<PathBuf>> {
        self.fetcher.fetch_ligands(ids, &self.dirs.ligands).await
    }

    /// Receptor branch: fetch entry -> isolate protein -> pdb2pqr ->
    /// patch PQR headers -> Open Babel -> patch receptor PDBQT headers.
    pub async fn prepare_receptor(&self, structure: &StructureId) -> Result<PathBuf> {
        let entry_path = self
            .fetcher
            .fetch_structure(structure, &self.dirs.structures)
            .await?;
        let entry_text = fs::read_to_string(&entry_path).await?;
        let protein_path = self
            .dirs
            .structures
            .join(format!("{}_protein.pdb", structure));
        fs::write(&protein_path, isolate_protein(&entry_text)).await?;

        fs::create_dir_all(&self.dirs.pdbqt).await?;
        let pqr_path = self.dirs.pdbqt.join(format!("{}.pqr", structure));
        let pdb_h_path = self.dirs.pdbqt.join(format!("{}_h.pdb", structure));
        let repaired = self
            .pdb2pqr
            .run(&protein_path, &pqr_path, &pdb_h_path)
            .await?;
        // pdb2pqr and Open Babel both emit TITLE/CRYST1 records the
        // docking engine's strict parser rejects; patch at each handoff
        patch::patch_file(&repaired.pqr).await?;

        let receptor_pdbqt = self.dirs.pdbqt.join(format!("{}.pdbqt", structure));
        self.obabel
            .receptor_to_pdbqt(&repaired.pqr, &receptor_pdbqt)
            .await?;
        patch::patch_file(&receptor_pdbqt).await?;

        Ok(receptor_pdbqt)
    }

    /// Ligand branch: fetch ideal-coordinate SDF -> Open Babel PDBQT.
    pub async fn prepare_ligand(&self, ligand: &LigandId) -> Result<PathBuf> {
        let sdf_path = self.fetcher.fetch_ligand(ligand, &self.dirs.ligands).await?;
        let ligand_pdbqt = self.dirs.pdbqt.join(format!("{}.pdbqt", ligand));
        fs::create_dir_all(&self.dirs.pdbqt).await?;
        self.obabel
            .ligand_to_pdbqt(&sdf_path, &ligand_pdbqt, self.ph)
            .await?;
        Ok(ligand_pdbqt)
    }

    /// Prepare one protein-ligand pair for docking.
    pub async fn prepare(
        &self,
        structure: &StructureId,
        ligand: &LigandId,
    ) -> Result<PreparedPair> {
        info!("Preparing {} / {} for docking", structure, ligand);

        let receptor_pdbqt = self.prepare_receptor(structure).await?;
        let ligand_pdbqt = self.prepare_ligand(ligand).await?;

        info!(
            "Docking pair ready: {:?} + {:?}",
            receptor_pdbqt, ligand_pdbqt
        );
        Ok(PreparedPair {
            receptor_pdbqt,
            ligand_pdbqt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, body).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn staging_dirs(root: &Path) -> StagingDirs {
        StagingDirs {
            ligands: root.join("ligands"),
            structures: root.join("protein_structures"),
            pdbqt: root.join("pdbqt"),
        }
    }

    #[test]
    fn test_pipeline_construction() {
        let dir = tempdir().unwrap();
        let pipeline =
            PrepPipeline::new(staging_dirs(dir.path()), "pdb2pqr", "obabel", 7.4).unwrap();
        assert_eq!(pipeline.ph, 7.4);
    }

    #[tokio::test]
    async fn test_receptor_pqr_patched_before_conversion() {
        let dir = tempdir().unwrap();
        let dirs = staging_dirs(dir.path());

        // Stand-in pdb2pqr: emits a PQR carrying the header records the
        // strict parser rejects. Args: --ff=AMBER --with-ph PH
        // --pdb-output PDB_OUT INPUT PQR_OUT
        let pdb2pqr = dir.path().join("pdb2pqr");
        write_script(
            &pdb2pqr,
            "#!/bin/sh\n\
             printf 'TITLE     test\\nCRYST1    1.0\\nATOM      1\\n' > \"$7\"\n\
             cp \"$6\" \"$5\"\n",
        );

        // Stand-in obabel: copies its input verbatim. Args: INPUT -O OUT -xr
        let obabel = dir.path().join("obabel");
        write_script(&obabel, "#!/bin/sh\ncp \"$1\" \"$3\"\n");

        // Seed the structure cache so no network call happens
        let id = StructureId::new("2zq2").unwrap();
        std::fs::create_dir_all(&dirs.structures).unwrap();
        std::fs::write(
            dirs.structures.join("2zq2.pdb"),
            "ATOM      1  N   ASP A  14      11.270  37.207  25.262  1.00 18.14           N\nEND\n",
        )
        .unwrap();

        let pipeline = PrepPipeline::new(dirs.clone(), &pdb2pqr, &obabel, 7.4).unwrap();
        let receptor = pipeline.prepare_receptor(&id).await.unwrap();

        // The PQR is patched before the conversion step consumes it
        let pqr = std::fs::read_to_string(dirs.pdbqt.join("2zq2.pqr")).unwrap();
        assert!(!pqr.contains("TITLE"));
        assert!(!pqr.contains("CRYST1"));

        // The conversion saw the already-patched PQR, and the final PDBQT
        // is patched again at the last handoff
        let pdbqt = std::fs::read_to_string(&receptor).unwrap();
        assert_eq!(pdbqt, pqr);
        assert!(!pdbqt.contains("CRYST1"));
    }
}
