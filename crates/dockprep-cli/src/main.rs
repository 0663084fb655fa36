//! dockprep — PDB enzyme/ligand retrieval and docking preparation.
//! Entry point for the CLI binary.

mod config;

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dockprep_common::{LigandId, StructureId};
use dockprep_pipeline::pipeline::StagingDirs;
use dockprep_pipeline::{PrepPipeline, Survey};
use dockprep_search::{Predicate, Query};

fn build_query(search: &config::SearchConfig) -> Query {
    Query::new()
        .and(Predicate::ec_lineage(&search.ec_number))
        .and(Predicate::ligand_weight_min(search.ligand_weight_min))
        .and(Predicate::ligand_weight_max(search.ligand_weight_max))
}

fn build_pipeline(config: &config::Config) -> anyhow::Result<PrepPipeline> {
    let dirs = StagingDirs {
        ligands: PathBuf::from(&config.storage.ligands_dir),
        structures: PathBuf::from(&config.storage.structures_dir),
        pdbqt: PathBuf::from(&config.storage.pdbqt_dir),
    };
    PrepPipeline::new(dirs, &config.tools.pdb2pqr, &config.tools.obabel, config.tools.ph)
}

/// Head of the survey's ligand projection, service order preserved.
fn sample_ligands(survey: &Survey, sample_size: usize) -> Vec<LigandId> {
    survey.ligands.iter().take(sample_size).cloned().collect()
}

fn print_survey(survey: &Survey) {
    println!("Entries: {}", survey.entries.len());
    for id in survey.entries.iter().take(10) {
        println!("  {}", id);
    }
    println!("Ligands: {}", survey.ligands.len());
    for id in survey.ligands.iter().take(10) {
        println!("  {}", id);
    }
}

fn usage() -> &'static str {
    "Usage: dockprep <command>\n\
     \n\
     Commands:\n\
       survey                    query the PDB and list matching entries and ligands\n\
       stage                     survey, then download ideal-coordinate SDFs for a sample of ligands\n\
       prep <PDB_ID> <LIGAND>    prepare one protein-ligand pair for docking\n\
       run                       survey followed by stage, reusing one result set"
}

async fn stage_from_survey(
    pipeline: &PrepPipeline,
    config: &config::Config,
    survey: &Survey,
) -> anyhow::Result<()> {
    let sample = sample_ligands(survey, config.search.sample_size);
    let paths = pipeline.stage_ligands(&sample).await?;

    info!("Staged {} ligand files under {}", paths.len(), config.storage.ligands_dir);
    for path in &paths {
        println!("  {}", path.display());
    }
    Ok(())
}

async fn cmd_survey(config: &config::Config) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let survey = pipeline.survey(&build_query(&config.search)).await?;
    print_survey(&survey);
    Ok(())
}

async fn cmd_stage(config: &config::Config) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let survey = pipeline.survey(&build_query(&config.search)).await?;
    stage_from_survey(&pipeline, config, &survey).await
}

async fn cmd_run(config: &config::Config) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    // One survey feeds both the listing and the staging step
    let survey = pipeline.survey(&build_query(&config.search)).await?;
    print_survey(&survey);
    stage_from_survey(&pipeline, config, &survey).await
}

async fn cmd_prep(config: &config::Config, pdb_id: &str, ligand_id: &str) -> anyhow::Result<()> {
    let structure = StructureId::new(pdb_id).context("invalid PDB entry code")?;
    let ligand = LigandId::new(ligand_id).context("invalid ligand code")?;

    let pipeline = build_pipeline(config)?;
    let pair = pipeline.prepare(&structure, &ligand).await?;

    println!("Receptor: {}", pair.receptor_pdbqt.display());
    println!("Ligand:   {}", pair.ligand_pdbqt.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dockprep=debug,info")),
        )
        .init();

    info!("🧪 dockprep starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match config::Config::load() {
        Ok(c) => {
            info!(
                "Configuration loaded. EC: {}, ligand weight: {}-{} Da",
                c.search.ec_number, c.search.ligand_weight_min, c.search.ligand_weight_max
            );
            c
        }
        Err(e) => {
            tracing::warn!("Could not load dockprep.toml: {e}");
            tracing::warn!("Copy dockprep.example.toml to dockprep.toml and edit it.");
            return Ok(());
        }
    };

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("survey") => cmd_survey(&config).await,
        Some("stage") => cmd_stage(&config).await,
        Some("prep") => match (args.get(2), args.get(3)) {
            (Some(pdb_id), Some(ligand_id)) => cmd_prep(&config, pdb_id, ligand_id).await,
            _ => anyhow::bail!("prep needs a PDB entry code and a ligand code\n\n{}", usage()),
        },
        Some("run") => cmd_run(&config).await,
        _ => {
            println!("{}", usage());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_conjoins_configured_predicates() {
        let search = config::SearchConfig::default();
        let query = build_query(&search);
        assert_eq!(query.predicates().len(), 3);
        assert_eq!(
            query.predicates()[0].attribute,
            "rcsb_polymer_entity.rcsb_ec_lineage.id"
        );
    }

    #[test]
    fn test_sample_respects_configured_size() {
        let survey = Survey {
            entries: Vec::new(),
            ligands: ["0CA", "0CB", "0G6", "13U", "GBS"]
                .iter()
                .map(|s| LigandId::new(s).unwrap())
                .collect(),
        };
        let sample = sample_ligands(&survey, 3);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample[0].as_str(), "0CA");
        assert_eq!(sample[2].as_str(), "0G6");

        // A sample larger than the result set is just the result set
        assert_eq!(sample_ligands(&survey, 100).len(), 5);
    }
}
