//! JSON snapshot files
//!
//! Reads the roster and reads/writes encounter snapshots for the CLI.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::combat::{EncounterContext, InitiativeState, ParseDiceError};

/// Errors reading or writing snapshot files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad hit die {die_type:?} for {combatant} in {path}: {source}")]
    InvalidHitDie {
        path: PathBuf,
        combatant: String,
        die_type: String,
        #[source]
        source: ParseDiceError,
    },
}

/// Read and decode a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode and write a JSON file, replacing it whole
pub fn save_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), StoreError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    // Write beside the target and rename so readers never see a partial file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, encoded + "\n")
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Load the roster, rejecting hit dice that are not a single die type
pub fn load_roster(path: &Path) -> Result<EncounterContext, StoreError> {
    let context: EncounterContext = load_json(path)?;
    for combatant in &context.roster {
        combatant
            .validate_hit_dice()
            .map_err(|(die_type, source)| StoreError::InvalidHitDie {
                path: path.to_path_buf(),
                combatant: combatant.name.clone(),
                die_type,
                source,
            })?;
    }
    Ok(context)
}

/// Load an encounter snapshot, or the initial state if none was saved yet
pub fn load_state(path: &Path, context: &EncounterContext) -> Result<InitiativeState, StoreError> {
    if !path.exists() {
        debug!("{} not found, starting a fresh encounter", path.display());
        return Ok(context.initial_state());
    }
    load_json(path)
}

pub fn save_state(path: &Path, state: &InitiativeState, pretty: bool) -> Result<(), StoreError> {
    save_json(path, state, pretty)
}
