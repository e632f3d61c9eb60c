//! The sweep loop: dimension → test point → frequency step.
//!
//! The driver owns nothing global. It is handed the runtime, the simulator and
//! the banner output, walks every dimension in canonical order, and reports
//! progress and completion to the runtime as it goes.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tonosweep_core::analysis::{self, FiringRates, TuningStats};
use tonosweep_core::format::{render_status, render_summary};
use tonosweep_core::{
    BoxStyle, Clock, DimensionId, RateError, SummaryReport, SweepError, SweepRuntime,
    SweepSpecification, SweepValue, counter,
};

use crate::config::ExperimentConfig;
use crate::parameters::{CategoryConfig, ParameterError, ParameterSet};
use crate::simulator::{SimulationRequest, Simulator, SimulatorError};

/// Everything the loop needs besides the runtime and the simulator
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub parameters: ParameterSet,
    pub categories: BTreeMap<String, CategoryConfig>,
    pub notify: bool,
    pub style: BoxStyle,
}

impl SweepPlan {
    pub fn from_config(config: &ExperimentConfig, notify: bool) -> Self {
        Self {
            parameters: config.parameters.clone(),
            categories: config.categories.clone(),
            notify,
            style: BoxStyle::default(),
        }
    }
}

/// Tuning statistics of one test point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPointResult {
    pub trial_index: usize,
    /// The swept values applied at this point
    pub values: BTreeMap<String, SweepValue>,
    pub tuning: BTreeMap<String, TuningStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: DimensionId,
    pub points: Vec<TestPointResult>,
}

/// Everything a finished sweep produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub dimensions: Vec<DimensionResult>,
    pub summary: SummaryReport,
}

#[derive(Debug)]
pub enum DriverError {
    Sweep(SweepError),
    Parameters(ParameterError),
    Simulator {
        dimension: DimensionId,
        trial_index: usize,
        frequency_index: usize,
        source: SimulatorError,
    },
    Rates {
        dimension: DimensionId,
        trial_index: usize,
        source: RateError,
    },
    Io(io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Sweep(e) => write!(f, "{e}"),
            DriverError::Parameters(e) => write!(f, "{e}"),
            DriverError::Simulator {
                dimension,
                trial_index,
                frequency_index,
                source,
            } => write!(
                f,
                "simulation failed for {dimension} (point {trial_index}, frequency {frequency_index}): {source}"
            ),
            DriverError::Rates {
                dimension,
                trial_index,
                source,
            } => write!(f, "bad firing rates for {dimension} (point {trial_index}): {source}"),
            DriverError::Io(e) => write!(f, "failed to write progress: {e}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Sweep(e) => Some(e),
            DriverError::Parameters(e) => Some(e),
            DriverError::Simulator { source, .. } => Some(source),
            DriverError::Rates { source, .. } => Some(source),
            DriverError::Io(e) => Some(e),
        }
    }
}

impl From<SweepError> for DriverError {
    fn from(e: SweepError) -> Self {
        DriverError::Sweep(e)
    }
}

impl From<ParameterError> for DriverError {
    fn from(e: ParameterError) -> Self {
        DriverError::Parameters(e)
    }
}

impl From<io::Error> for DriverError {
    fn from(e: io::Error) -> Self {
        DriverError::Io(e)
    }
}

/// The swept values of every test point of a dimension, in trial order.
///
/// Pairs iterate the first name's values in the outer loop, so point
/// `i * len(b) + j` holds `(a[i], b[j])`.
pub fn test_points(
    spec: &SweepSpecification,
    dimension: &DimensionId,
) -> Result<Vec<Vec<(String, SweepValue)>>, SweepError> {
    let domain = |name: &str| {
        spec.domain(name)
            .ok_or_else(|| SweepError::UnknownDimension(dimension.clone()))
    };
    Ok(match dimension {
        DimensionId::Single(name) => domain(name)?
            .iter()
            .map(|v| vec![(name.clone(), v.clone())])
            .collect(),
        DimensionId::Pair(a, b) => {
            let (xs, ys) = (domain(a)?, domain(b)?);
            let mut points = Vec::with_capacity(xs.len() * ys.len());
            for x in xs {
                for y in ys {
                    points.push(vec![(a.clone(), x.clone()), (b.clone(), y.clone())]);
                }
            }
            points
        }
    })
}

fn check_categories(
    rates: &analysis::FrequencyRates,
    sizes: &BTreeMap<String, u64>,
) -> Result<(), SimulatorError> {
    if rates.keys().eq(sizes.keys()) {
        Ok(())
    } else {
        Err(SimulatorError::Protocol(format!(
            "expected categories {:?}, got {:?}",
            sizes.keys().collect::<Vec<_>>(),
            rates.keys().collect::<Vec<_>>()
        )))
    }
}

/// Run the whole sweep, writing a status banner before every frequency step
/// and the summary banner at the end.
pub fn run_sweep<C: Clock>(
    runtime: &mut SweepRuntime<C>,
    plan: &SweepPlan,
    simulator: &mut dyn Simulator,
    out: &mut dyn Write,
) -> Result<SweepOutcome, DriverError> {
    let spec = runtime.spec().clone();
    let frequency_count = runtime.frequency_count();
    let dimensions = counter::dimensions(&spec, runtime.mode())?;

    tracing::info!(
        dimensions = runtime.total_dimensions(),
        total_trials = runtime.total_trials(),
        mode = %runtime.mode(),
        "Starting sweep"
    );

    let mut results = Vec::with_capacity(dimensions.len());
    for dimension in dimensions {
        let points = test_points(&spec, &dimension)?;
        tracing::info!(dimension = %dimension, points = points.len(), "Starting dimension");

        let mut point_results = Vec::with_capacity(points.len());
        for (trial_index, overrides) in points.into_iter().enumerate() {
            let parameters = plan
                .parameters
                .with_overrides(overrides.iter().map(|(name, value)| (name.as_str(), value)));
            let category_sizes = parameters.category_sizes(&plan.categories)?;

            let mut rates = FiringRates::new();
            for frequency_index in 0..frequency_count {
                let status = runtime.live_update(frequency_index, trial_index, &dimension)?;
                writeln!(out, "{}", render_status(&status, &plan.style))?;

                let request = SimulationRequest {
                    parameters: &parameters,
                    frequency_index,
                    frequency_count,
                    category_sizes: &category_sizes,
                };
                let step = simulator
                    .simulate(&request)
                    .and_then(|step| check_categories(&step, &category_sizes).map(|()| step))
                    .map_err(|source| DriverError::Simulator {
                        dimension: dimension.clone(),
                        trial_index,
                        frequency_index,
                        source,
                    })?;
                rates
                    .record_frequency(step)
                    .map_err(|source| DriverError::Rates {
                        dimension: dimension.clone(),
                        trial_index,
                        source,
                    })?;
            }

            point_results.push(TestPointResult {
                trial_index,
                values: overrides.into_iter().collect(),
                tuning: analysis::summarize(&rates),
            });
        }

        runtime.register_completion(dimension.clone())?;
        tracing::info!(dimension = %dimension, "Finished dimension");
        results.push(DimensionResult {
            dimension,
            points: point_results,
        });
    }

    let summary = runtime.finish()?;
    writeln!(out, "{}", render_summary(&summary, &plan.style))?;
    out.flush()?;
    tracing::info!(elapsed_minutes = summary.elapsed_minutes, "Sweep complete");

    Ok(SweepOutcome {
        dimensions: results,
        summary,
    })
}

/// Send the completion notification for a finished sweep if the plan asks
/// for one, recording the outcome in its summary.
///
/// Kept apart from [`run_sweep`] so the summary banner and the results file
/// exist before a slow or hanging transport is contacted.
pub fn notify_completion<C: Clock>(
    runtime: &mut SweepRuntime<C>,
    plan: &SweepPlan,
    outcome: &mut SweepOutcome,
) -> Result<(), DriverError> {
    if !plan.notify {
        return Ok(());
    }
    outcome.summary.notification = runtime.send_notification(&outcome.summary)?;
    tracing::info!(notification = ?outcome.summary.notification, "Notification handled");
    Ok(())
}
