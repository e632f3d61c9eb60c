//! Tonotopic tuning sweep runner
//!
//! Loads an experiment file, walks every sweep dimension through an external
//! network simulator, prints boxed progress banners, summarizes tuning widths
//! per neuron category and saves the results as YAML.

#![warn(clippy::all)]

// ============================================================================
// Experiment setup
// ============================================================================

pub mod config;
pub mod parameters;

// ============================================================================
// Running a sweep
// ============================================================================

pub mod driver;
pub mod notifier;
pub mod simulator;

// ============================================================================
// Output
// ============================================================================

mod logging;
pub mod output;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{ConfigError, ExperimentConfig, NotifyConfig, SimulatorConfig, SinkConfig};
pub use driver::{DriverError, SweepOutcome, SweepPlan, notify_completion, run_sweep};
pub use logging::init_logging;
pub use notifier::{CommandSink, OutboxSink, build_sink};
pub use output::write_outcome;
pub use parameters::{CategoryConfig, ParameterSet};
pub use simulator::{CommandSimulator, SimulationRequest, Simulator, SimulatorError};
