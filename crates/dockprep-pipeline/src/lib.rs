//! dockprep-pipeline — Staging a protein-ligand pair for docking.
//!
//! The pipeline runs in four stages:
//! 1. Fetching artifacts from the RCSB bulk-download service (entries,
//!    ideal-coordinate ligand SDFs)
//! 2. Isolating the protein from the experimental structure
//! 3. Repair/protonation (pdb2pqr) and PDBQT conversion (Open Babel)
//! 4. Patching header records the strict docking-engine parser rejects

pub mod fetch;
pub mod ligand;
pub mod patch;
pub mod pipeline;
pub mod receptor;

pub use fetch::ArtifactFetcher;
pub use pipeline::{PrepPipeline, PreparedPair, Survey};
