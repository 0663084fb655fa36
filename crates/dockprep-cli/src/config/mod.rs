//! Configuration loading for dockprep.
//! Reads dockprep.toml from the current directory or path in DOCKPREP_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Enzyme Commission lineage the survey matches under, e.g. trypsin.
    #[serde(default = "default_ec_number")]
    pub ec_number: String,
    #[serde(default = "default_weight_min")]
    pub ligand_weight_min: f64,
    #[serde(default = "default_weight_max")]
    pub ligand_weight_max: f64,
    /// How many ligands `stage` downloads from the head of the result set.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_ec_number()  -> String { "3.4.21.4".to_string() }
fn default_weight_min() -> f64 { 300.0 }
fn default_weight_max() -> f64 { 800.0 }
fn default_sample_size() -> usize { 5 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ec_number: default_ec_number(),
            ligand_weight_min: default_weight_min(),
            ligand_weight_max: default_weight_max(),
            sample_size: default_sample_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_ligands_dir")]
    pub ligands_dir: String,
    #[serde(default = "default_structures_dir")]
    pub structures_dir: String,
    #[serde(default = "default_pdbqt_dir")]
    pub pdbqt_dir: String,
}

fn default_ligands_dir()    -> String { "ligands".to_string() }
fn default_structures_dir() -> String { "protein_structures".to_string() }
fn default_pdbqt_dir()      -> String { "pdbqt".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ligands_dir: default_ligands_dir(),
            structures_dir: default_structures_dir(),
            pdbqt_dir: default_pdbqt_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_pdb2pqr")]
    pub pdb2pqr: String,
    #[serde(default = "default_obabel")]
    pub obabel: String,
    #[serde(default = "default_ph")]
    pub ph: f64,
}

fn default_pdb2pqr() -> String { "pdb2pqr".to_string() }
fn default_obabel()  -> String { "obabel".to_string() }
fn default_ph()      -> f64 { 7.4 }

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pdb2pqr: default_pdb2pqr(),
            obabel: default_obabel(),
            ph: default_ph(),
        }
    }
}


impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("DOCKPREP_CONFIG")
            .unwrap_or_else(|_| "dockprep.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy dockprep.example.toml to dockprep.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
