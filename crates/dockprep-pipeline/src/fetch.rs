//! Artifact fetching from the RCSB bulk-download service.
//!
//! Download URLs are deterministic: a fixed base, the normalized
//! identifier, a fixed suffix. The local path mirrors that — one file per
//! identifier, overwritten on re-run, so a repeated batch is idempotent.
//! The HTTP status is validated before anything touches disk; an error
//! body is never persisted as artifact content.

use anyhow::Context;
use dockprep_common::sandbox::SandboxClient as Client;
use dockprep_common::{LigandId, StructureId};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

const RCSB_FILES_URL: &str = "https://files.rcsb.org";

/// Suffix of the chemically-idealized coordinate artifact for a component.
pub const IDEAL_SDF_SUFFIX: &str = "_ideal.sdf";

/// Local path for one artifact. Pure function of its inputs: distinct
/// identifiers never collide and the same identifier always maps to the
/// same file.
pub fn artifact_path(dest_dir: &Path, identifier: &str, suffix: &str) -> PathBuf {
    dest_dir.join(format!("{}{}", identifier, suffix))
}

/// Client for fetching structures and ligand coordinates from RCSB.
pub struct ArtifactFetcher {
    client: Client,
    base_url: String,
}

impl ArtifactFetcher {
    /// Create a new ArtifactFetcher against the RCSB bulk-download service.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(RCSB_FILES_URL)
    }

    /// Create a new ArtifactFetcher against an alternate download host.
    /// The host must still pass the sandbox allowlist (loopback is allowed
    /// for local fixtures).
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the ideal-coordinate SDF for a single component.
    #[instrument(skip(self))]
    pub async fn fetch_ligand(&self, id: &LigandId, dest_dir: &Path) -> anyhow::Result<PathBuf> {
        let url = format!("{}/ligands/download/{}{}", self.base_url, id, IDEAL_SDF_SUFFIX);
        let file_path = artifact_path(dest_dir, id.as_str(), IDEAL_SDF_SUFFIX);

        let response = self
            .client
            .get(&url)?
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("fetching ideal coordinates for ligand {}", id))?;
        let content = response.bytes().await?;

        fs::create_dir_all(dest_dir).await?;
        fs::write(&file_path, content).await?;

        Ok(file_path)
    }

    /// Fetch ideal-coordinate SDFs for a sequence of components, one file
    /// per identifier. Strictly sequential; the first failed fetch aborts
    /// the batch with the failing identifier in the error. Files already
    /// written stay on disk — each is individually complete and a re-run
    /// overwrites them.
    #[instrument(skip(self, ids))]
    pub async fn fetch_ligands(
        &self,
        ids: &[LigandId],
        dest_dir: &Path,
    ) -> anyhow::Result<Vec<PathBuf>> {
        info!("Fetching {} ligand coordinate files", ids.len());

        let mut paths = Vec::with_capacity(ids.len());
        for id in ids {
            paths.push(self.fetch_ligand(id, dest_dir).await?);
        }

        Ok(paths)
    }

    /// Fetch a PDB entry by its ID. Cached: an existing file under the
    /// destination directory short-circuits the network call.
    #[instrument(skip(self))]
    pub async fn fetch_structure(
        &self,
        id: &StructureId,
        dest_dir: &Path,
    ) -> anyhow::Result<PathBuf> {
        let file_name = format!("{}.pdb", id);
        let file_path = dest_dir.join(&file_name);

        if file_path.exists() {
            debug!("PDB {} found in cache", id);
            return Ok(file_path);
        }

        info!("Fetching PDB {} from RCSB", id);
        let url = format!("{}/download/{}", self.base_url, file_name);
        let response = self
            .client
            .get(&url)?
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("fetching PDB entry {}", id))?;
        let content = response.bytes().await?;

        fs::create_dir_all(dest_dir).await?;
        fs::write(&file_path, content).await?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::tempdir;

    /// Minimal one-shot HTTP listener: answers `responses` sequential
    /// requests with the given status line and body, then exits.
    fn spawn_server(
        responses: usize,
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            for _ in 0..responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        (format!("http://127.0.0.1:{}", port), handle)
    }

    #[test]
    fn test_artifact_path_is_pure() {
        let dir = Path::new("/tmp/ligands");
        let a = artifact_path(dir, "0CA", IDEAL_SDF_SUFFIX);
        let b = artifact_path(dir, "0CA", IDEAL_SDF_SUFFIX);
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/tmp/ligands/0CA_ideal.sdf"));
    }

    #[test]
    fn test_artifact_paths_never_collide() {
        let dir = Path::new("/tmp/ligands");
        let ids = ["0CA", "0CB", "0G6"];
        let paths: Vec<PathBuf> = ids
            .iter()
            .map(|id| artifact_path(dir, id, IDEAL_SDF_SUFFIX))
            .collect();
        assert_eq!(paths[0].file_name().unwrap(), "0CA_ideal.sdf");
        assert_eq!(paths[1].file_name().unwrap(), "0CB_ideal.sdf");
        assert_eq!(paths[2].file_name().unwrap(), "0G6_ideal.sdf");
        assert!(paths.iter().all(|p| paths.iter().filter(|q| *q == p).count() == 1));
    }

    #[tokio::test]
    async fn test_batch_writes_one_file_per_identifier() {
        let dir = tempdir().unwrap();
        let (base, server) = spawn_server(3, "200 OK", "fake ideal coordinates\n");
        let ids: Vec<LigandId> = ["0CA", "0CB", "0G6"]
            .iter()
            .map(|s| LigandId::new(s).unwrap())
            .collect();

        // A stale file from an earlier run gets overwritten, not appended to
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("0CA_ideal.sdf"), "stale").unwrap();

        let fetcher = ArtifactFetcher::with_base_url(&base).unwrap();
        let paths = fetcher.fetch_ligands(&ids, dir.path()).await.unwrap();
        server.join().unwrap();

        assert_eq!(paths.len(), 3);
        for (path, name) in paths.iter().zip(["0CA_ideal.sdf", "0CB_ideal.sdf", "0G6_ideal.sdf"]) {
            assert_eq!(path.file_name().unwrap(), name);
            let content = std::fs::read_to_string(path).unwrap();
            assert_eq!(content, "fake ideal coordinates\n");
        }
    }

    #[tokio::test]
    async fn test_missing_ligand_writes_no_file() {
        let dir = tempdir().unwrap();
        let (base, server) = spawn_server(1, "404 Not Found", "not here");
        let id = LigandId::new("ZZ9").unwrap();

        let fetcher = ArtifactFetcher::with_base_url(&base).unwrap();
        let result = fetcher.fetch_ligand(&id, dir.path()).await;
        server.join().unwrap();

        // The error body must never be persisted as artifact content
        assert!(result.is_err());
        assert!(!artifact_path(dir.path(), "ZZ9", IDEAL_SDF_SUFFIX).exists());
    }

    #[tokio::test]
    async fn test_structure_cache_short_circuits() {
        let dir = tempdir().unwrap();
        let id = StructureId::new("2ZQ2").unwrap();
        let cached = dir.path().join("2zq2.pdb");
        tokio::fs::write(&cached, "HEADER    CACHED\n").await.unwrap();

        let fetcher = ArtifactFetcher::new().unwrap();
        let path = fetcher.fetch_structure(&id, dir.path()).await.unwrap();

        assert_eq!(path, cached);
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "HEADER    CACHED\n");
    }

    // Hits the live RCSB download service; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_live_batch_fetches_real_components() {
        let dir = tempdir().unwrap();
        let ids: Vec<LigandId> = ["0CA", "0CB", "0G6"]
            .iter()
            .map(|s| LigandId::new(s).unwrap())
            .collect();

        let fetcher = ArtifactFetcher::new().unwrap();
        let paths = fetcher.fetch_ligands(&ids, dir.path()).await.unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));
    }
}
