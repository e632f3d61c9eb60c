//! Experiment file: base parameters, sweep, simulator and notification setup.
//!
//! ```yaml
//! frequency_count: 5
//! mode: paired
//! parameters:
//!   pyr_conn_p_center: 1.0
//!   pyr_layer_num: 500
//! sweep:
//!   pyr_conn_p_center: [0.1, 0.2, 0.3]
//! categories:
//!   pyr: { size_parameter: pyr_layer_num }
//! simulator:
//!   program: ./run_network.py
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tonosweep_core::{SweepMode, SweepSpecification, counter};

use crate::parameters::{CategoryConfig, ParameterSet};

/// Error types for loading an experiment
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid experiment: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// External simulator invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Where the completion notification goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkConfig {
    /// Append to a mail-spool style file
    Outbox { path: PathBuf },
    /// Pipe the body into a command; `{subject}` in args is substituted
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Only write the message to the log
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub sink: SinkConfig,
}

fn default_enabled() -> bool {
    true
}

/// A complete experiment description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Frequency steps simulated per test point
    pub frequency_count: usize,
    #[serde(default)]
    pub mode: SweepMode,
    /// Base parameter record; swept values override it per step
    pub parameters: ParameterSet,
    pub sweep: SweepSpecification,
    /// Neuron category → parameter holding its layer size
    pub categories: BTreeMap<String, CategoryConfig>,
    pub simulator: SimulatorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

impl ExperimentConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate an experiment file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_count == 0 {
            return Err(ConfigError::Invalid(
                "frequency_count must be positive".to_string(),
            ));
        }
        counter::validate(&self.sweep, self.mode).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(name) = self.sweep.names().find(|name| !self.parameters.contains(name)) {
            return Err(ConfigError::Invalid(format!(
                "swept variable `{name}` has no base value in parameters"
            )));
        }

        if self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one neuron category is required".to_string(),
            ));
        }
        self.parameters
            .category_sizes(&self.categories)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // Every swept value must still leave a usable layer size
        for (name, values) in self.sweep.iter() {
            for value in values {
                self.parameters
                    .with_overrides([(name, value)])
                    .category_sizes(&self.categories)
                    .map_err(|e| {
                        ConfigError::Invalid(format!("sweep value {value} of `{name}`: {e}"))
                    })?;
            }
        }

        Ok(())
    }

    /// Whether the experiment asks for a completion notification
    pub fn notify_enabled(&self) -> bool {
        self.notify.as_ref().is_some_and(|n| n.enabled)
    }
}
