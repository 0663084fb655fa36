//! Identifier newtypes for PDB entries and chemical components.
//!
//! The RCSB services and the local filesystem are both case-sensitive while
//! user input is not, so each identifier is normalized exactly once, in its
//! constructor. Every URL and path downstream is derived from the already
//! normalized form:
//!   - entry codes (4 characters) are lowercased, matching the
//!     `files.rcsb.org/download/{id}.pdb` convention;
//!   - chemical-component codes (1-3 characters) are uppercased, matching
//!     the `files.rcsb.org/ligands/download/{ID}_ideal.sdf` convention.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DockprepError;

/// A 4-character PDB entry code, e.g. `2zq2`. Stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StructureId(String);

impl StructureId {
    pub fn new(raw: &str) -> Result<Self, DockprepError> {
        let trimmed = raw.trim();
        if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DockprepError::InvalidIdentifier(format!(
                "not a 4-character PDB entry code: {:?}",
                raw
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StructureId {
    type Err = DockprepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StructureId {
    type Error = DockprepError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<StructureId> for String {
    fn from(id: StructureId) -> Self {
        id.0
    }
}

/// A 1-3 character chemical-component (ligand) code, e.g. `0CA`.
/// Stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LigandId(String);

impl LigandId {
    pub fn new(raw: &str) -> Result<Self, DockprepError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > 3
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DockprepError::InvalidIdentifier(format!(
                "not a 1-3 character chemical component code: {:?}",
                raw
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LigandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LigandId {
    type Err = DockprepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LigandId {
    type Error = DockprepError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<LigandId> for String {
    fn from(id: LigandId) -> Self {
        id.0
    }
}
