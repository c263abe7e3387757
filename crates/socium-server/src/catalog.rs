//! Personality catalog file loading.
//!
//! The on-disk shape groups personality types under their faction; the
//! engine wants a flat list with the faction tagged onto every record, so
//! flattening happens here, at the boundary that owns the external format.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use socium_core::{Faction, Personality, PersonalityCatalog};
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    personalities: Vec<FactionGroup>,
}

#[derive(Debug, Deserialize)]
struct FactionGroup {
    faction: Faction,
    #[serde(default)]
    types: Vec<PersonalityEntry>,
}

#[derive(Debug, Deserialize)]
struct PersonalityEntry {
    id: String,
    name: String,
    color: String,
    aggression: f32,
    empathy: f32,
    energy: f32,
}

/// Errors raised while loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid catalog JSON.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file parsed but carried no personality records.
    #[error("catalog file contains no personalities")]
    Empty,
}

/// Read and flatten a catalog file from disk.
pub fn load_catalog(path: &Path) -> Result<PersonalityCatalog, CatalogError> {
    let raw = fs::read_to_string(path)?;
    parse_catalog(&raw)
}

/// Flatten catalog JSON, tagging each record with its group's faction.
pub fn parse_catalog(raw: &str) -> Result<PersonalityCatalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(raw)?;
    let mut flattened = Vec::new();
    for group in file.personalities {
        for entry in group.types {
            flattened.push(Personality {
                id: entry.id,
                name: entry.name,
                color: entry.color,
                faction: group.faction,
                aggression: entry.aggression,
                empathy: entry.empathy,
                energy: entry.energy,
            });
        }
    }
    PersonalityCatalog::new(flattened).map_err(|_| CatalogError::Empty)
}
