//! CLI configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then `INITRACK_`-prefixed environment variables.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "initrack.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "INITRACK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Encounter snapshot (InitiativeState JSON)
    pub state_path: PathBuf,
    /// Roster and consumable definitions (EncounterContext JSON)
    pub roster_path: PathBuf,
    /// Pretty-print written snapshots
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("encounter.json"),
            roster_path: PathBuf::from("roster.json"),
            pretty: true,
        }
    }
}

impl Config {
    /// The figment used by `load`, exposed for tests and overrides
    pub fn figment(file: Option<&Path>) -> Figment {
        let file = file.unwrap_or(Path::new(CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration; a missing file is not an error
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }
}
