//! dockprep-search — RCSB PDB Search API client.
//!
//! Builds conjunctive attribute queries (Enzyme Commission lineage,
//! ligand formula-weight bounds) and submits them against the Search API,
//! projecting the same structural population into either entry codes or
//! chemical-component codes via the `return_type` selector.
//!
//! API docs: https://search.rcsb.org/#search-api

pub mod client;
pub mod query;

pub use client::SearchClient;
pub use query::{Comparison, Predicate, Query, ReturnType};
