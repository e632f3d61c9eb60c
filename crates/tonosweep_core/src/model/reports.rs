use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{DimensionId, SweepMode};

/// Snapshot of sweep progress at one frequency step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub mode: SweepMode,
    pub dimension: DimensionId,
    /// 1-based position of the current dimension
    pub dimension_ordinal: usize,
    pub total_dimensions: usize,
    /// 1-based position of the current test point within its dimension
    pub trial_ordinal: usize,
    pub dimension_trial_count: usize,
    /// 1-based position of the current frequency step
    pub frequency_ordinal: usize,
    pub frequency_count: usize,
    pub completed_trials: usize,
    pub total_trials: usize,
    /// Elapsed wall-clock time, rounded to the nearest minute
    pub elapsed_minutes: u64,
    /// Estimated time left, rounded up. `None` until a trial has completed.
    pub remaining_minutes: Option<u64>,
}

/// What happened to the completion notification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum NotificationOutcome {
    #[default]
    NotRequested,
    Delivered,
    Failed(String),
}

/// Final statistics of a finished sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub mode: SweepMode,
    pub total_dimensions: usize,
    pub frequency_count: usize,
    pub total_trials: usize,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    /// Total runtime, rounded up to the next whole minute
    pub elapsed_minutes: u64,
    pub notification: NotificationOutcome,
}
