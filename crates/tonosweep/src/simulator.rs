//! Bridge to the external network simulator.
//!
//! The simulator is opaque: it receives a parameter record and a frequency
//! step and answers with the firing rate of every recorded unit, grouped by
//! neuron category.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use serde::Serialize;
use tonosweep_core::analysis::FrequencyRates;

use crate::config::SimulatorConfig;
use crate::parameters::ParameterSet;

/// One frequency step of one test point
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRequest<'a> {
    pub parameters: &'a ParameterSet,
    pub frequency_index: usize,
    pub frequency_count: usize,
    pub category_sizes: &'a BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorError {
    /// The simulator could not be started or fed its request
    Spawn(String),
    /// The simulator ran but exited unsuccessfully
    Failed { status: String, stderr: String },
    /// The simulator's answer could not be understood
    Protocol(String),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::Spawn(msg) => write!(f, "could not run simulator: {msg}"),
            SimulatorError::Failed { status, stderr } => {
                write!(f, "simulator exited with {status}: {}", stderr.trim())
            }
            SimulatorError::Protocol(msg) => write!(f, "unexpected simulator output: {msg}"),
        }
    }
}

impl std::error::Error for SimulatorError {}

/// Runs one simulation per request
pub trait Simulator {
    fn simulate(&mut self, request: &SimulationRequest<'_>) -> Result<FrequencyRates, SimulatorError>;
}

impl<F> Simulator for F
where
    F: FnMut(&SimulationRequest<'_>) -> Result<FrequencyRates, SimulatorError>,
{
    fn simulate(&mut self, request: &SimulationRequest<'_>) -> Result<FrequencyRates, SimulatorError> {
        self(request)
    }
}

/// Runs an external program once per request.
///
/// The request is written to the program's stdin as JSON; the program must
/// print a JSON object mapping category → list of unit rates on stdout.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSimulator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

/// Stop and collect a child we gave up on, so it does not linger as a zombie
pub(crate) fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "Child already exited");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "Failed to collect child process");
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&mut self, request: &SimulationRequest<'_>) -> Result<FrequencyRates, SimulatorError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| SimulatorError::Spawn(format!("failed to encode request: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SimulatorError::Spawn(format!("{}: {e}", self.program.display())))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(&payload)
        {
            drop(stdin);
            reap(&mut child);
            return Err(SimulatorError::Spawn(format!("failed to write request: {e}")));
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SimulatorError::Spawn(format!("failed to wait for simulator: {e}")))?;

        if !output.status.success() {
            return Err(SimulatorError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| SimulatorError::Protocol(format!("invalid firing-rate JSON: {e}")))
    }
}
