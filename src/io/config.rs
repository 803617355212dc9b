use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dynamics::SimConfig;
use crate::error::SimError;
use crate::vehicle::RocketConfig;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Cannot read config file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error deserializing launch config")]
    Deserialize(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// Contents of a launch TOML file.
///
/// ```toml
/// [rocket]
/// name = "Club launch"
/// bottle_volume = 0.002
/// fill_fraction = 0.33
///
/// [rocket.environment]
/// temperature = 288.15
///
/// [simulation]
/// dt = 0.0005
/// ```
///
/// Missing keys fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchFile {
    pub rocket: RocketConfig,
    pub simulation: SimConfig,
}

impl LaunchFile {
    pub fn validate(&self) -> Result<(), SimError> {
        self.rocket.validate()?;
        self.simulation.validate()
    }
}

/// Parse and validate a launch config from a TOML string.
pub fn parse_str(toml_str: &str) -> Result<LaunchFile, ConfigFileError> {
    let launch: LaunchFile = toml::from_str(toml_str)?;
    launch.validate()?;
    Ok(launch)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<LaunchFile, ConfigFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text)
}
