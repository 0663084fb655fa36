//! dockprep-common — Shared types, errors, and the sandboxed HTTP client
//! used across all dockprep crates.

pub mod error;
pub mod ids;
pub mod sandbox;

// Re-export commonly used types
pub use error::{DockprepError, Result};
pub use ids::{LigandId, StructureId};
