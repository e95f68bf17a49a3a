//! Options for a conversion, and how they are layered.
//!
//! Options come from three places, each overriding the one before:
//!
//! 1. the built-in defaults ([`ConvertOptions::default`]),
//! 2. an optional TOML file,
//! 3. command line flags ([`OptionOverrides`]).
//!
//! A complete TOML file looks like this (every key is optional):
//!
//! ```toml
//! dataset_prefix = "dataset"
//! projection = "+proj=stere +lat_0=90 +lon_0=20 +lat_ts=60:6,51.3,49,70.2:600,800"
//!
//! [producer]
//! id = 1014
//! name = "RADAR"
//! ```
use std::{fmt::Display, path::Path, str::FromStr};

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file {0} does not exist")]
    NotFound(String),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
    #[error("Option producer expects a comma separated number and name, got '{0}'")]
    BadProducer(String),
    #[error("The dataset prefix must not be empty")]
    EmptyPrefix,
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Invalid(Box::new(value))
    }
}

/// The producer the output grid is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub id: u32,
    pub name: String,
}

impl Default for Producer {
    fn default() -> Self {
        Self { id: 1014, name: "RADAR".to_string() }
    }
}

impl Display for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.id, self.name)
    }
}

impl FromStr for Producer {
    type Err = ConfigError;

    /// Parse `"<id>,<name>"`, e.g. `"1014,RADAR"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        let [id, name] = parts[..] else {
            return Err(ConfigError::BadProducer(s.to_string()));
        };

        let id = id.trim().parse::<u32>().map_err(|_| ConfigError::BadProducer(s.to_string()))?;
        Ok(Self { id, name: name.trim().to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Name of the numbered top level groups holding the data, without the number
    pub dataset_prefix: String,
    /// Output grid as `<projdef>:<LL_lon>,<LL_lat>,<UR_lon>,<UR_lat>:<nx>,<ny>`;
    /// when absent the data stay on their native grid.
    pub projection: Option<String>,
    pub producer: Producer,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { dataset_prefix: "dataset".to_string(), projection: None, producer: Producer::default() }
    }
}

/// Command line values that take precedence over the configuration file.
/// Fields left as `None` do not override anything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    #[serde(skip_serializing_if = "ProducerOverride::is_empty")]
    pub producer: ProducerOverride,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProducerOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProducerOverride {
    fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }
}

impl ConvertOptions {
    fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut fig = Figment::from(Serialized::defaults(Self::default()));
        if let Some(p) = config_file {
            // figment treats a missing file as empty, but a file named on the command line must exist
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            fig = fig.merge(Toml::file(p));
        }
        Ok(fig)
    }

    /// Layer the defaults, `config_file` (if given) and `overrides`.
    pub fn load(config_file: Option<&Path>, overrides: &OptionOverrides) -> Result<Self, ConfigError> {
        let options: Self = Self::figment(config_file)?
            .merge(Serialized::defaults(overrides))
            .extract()?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let options: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(s))
            .extract()?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
