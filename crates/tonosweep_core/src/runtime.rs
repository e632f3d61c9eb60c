//! Progress tracking for a running sweep.
//!
//! A [`SweepRuntime`] is built once per experiment, fed progress by the
//! driver loop, and closed with [`SweepRuntime::final_report`]. Estimates are
//! a linear extrapolation of elapsed wall-clock time over the share of trials
//! done; nothing is known about the real cost of a trial.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use jiff::{SignedDuration, Timestamp};

use crate::counter;
use crate::error::{Result, SweepError};
use crate::format::summary_line;
use crate::model::{
    DimensionId, NotificationOutcome, StatusReport, SummaryReport, SweepMode, SweepSpecification,
};
use crate::notify::{COMPLETION_SUBJECT, NotificationSink};

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: SignedDuration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(SignedDuration::from_secs(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Seconds to minutes, rounded to the nearest minute
pub fn round_minutes(seconds: f64) -> u64 {
    ((seconds.max(0.0) + 30.0) / 60.0).floor() as u64
}

/// Seconds to minutes, rounded up so a started minute counts
pub fn ceil_minutes(seconds: f64) -> u64 {
    (seconds.max(0.0) / 60.0).ceil() as u64
}

/// Lifecycle of a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Complete,
}

/// Tracks progress through a multi-dimensional sweep
pub struct SweepRuntime<C: Clock = SystemClock> {
    spec: SweepSpecification,
    mode: SweepMode,
    frequency_count: usize,
    total_dimensions: usize,
    total_trials: usize,
    completed: Vec<DimensionId>,
    /// Trials contributed by every registered dimension
    completed_base: usize,
    origin_time: Timestamp,
    clock: C,
    notifier: Option<Box<dyn NotificationSink>>,
    notified: bool,
    phase: Phase,
}

impl SweepRuntime<SystemClock> {
    /// Build a runtime timed by the system clock
    pub fn new(spec: SweepSpecification, frequency_count: usize, mode: SweepMode) -> Result<Self> {
        Self::with_clock(spec, frequency_count, mode, SystemClock)
    }
}

impl<C: Clock> SweepRuntime<C> {
    /// Build a runtime timed by `clock`. The origin time is read immediately.
    pub fn with_clock(
        spec: SweepSpecification,
        frequency_count: usize,
        mode: SweepMode,
        clock: C,
    ) -> Result<Self> {
        let total_dimensions = counter::count_dimensions(&spec, mode)?;
        let total_trials = counter::count_trials(&spec, mode, frequency_count)?;
        let origin_time = clock.now();

        Ok(Self {
            spec,
            mode,
            frequency_count,
            total_dimensions,
            total_trials,
            completed: Vec::with_capacity(total_dimensions),
            completed_base: 0,
            origin_time,
            clock,
            notifier: None,
            notified: false,
            phase: Phase::Active,
        })
    }

    /// Attach the collaborator used by [`final_report`](Self::final_report)
    pub fn with_notifier(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notifier = Some(sink);
        self
    }

    pub fn spec(&self) -> &SweepSpecification {
        &self.spec
    }

    pub fn mode(&self) -> SweepMode {
        self.mode
    }

    pub fn frequency_count(&self) -> usize {
        self.frequency_count
    }

    pub fn total_dimensions(&self) -> usize {
        self.total_dimensions
    }

    pub fn total_trials(&self) -> usize {
        self.total_trials
    }

    pub fn completed_dimensions(&self) -> &[DimensionId] {
        &self.completed
    }

    pub fn origin_time(&self) -> Timestamp {
        self.origin_time
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of test points in a dimension of this sweep
    pub fn dimension_trial_count(&self, dimension: &DimensionId) -> Result<usize> {
        if !dimension.matches_mode(self.mode) {
            return Err(SweepError::UnknownDimension(dimension.clone()));
        }
        counter::dimension_trial_count(&self.spec, dimension)
    }

    fn ensure_active(&self, op: &'static str) -> Result<()> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Complete => Err(SweepError::PostCompletionUse(op)),
        }
    }

    fn elapsed_seconds(&self) -> (Timestamp, f64) {
        let now = self.clock.now();
        let elapsed = now.duration_since(self.origin_time).as_secs_f64().max(0.0);
        (now, elapsed)
    }

    /// Mark a dimension as finished. Call once, after its last trial.
    pub fn register_completion(&mut self, dimension: DimensionId) -> Result<()> {
        self.ensure_active("register_completion")?;
        let trials = self.dimension_trial_count(&dimension)?;
        if self.completed.contains(&dimension) {
            return Err(SweepError::DuplicateDimension(dimension));
        }

        self.completed_base += self.frequency_count * trials;
        tracing::debug!(
            dimension = %dimension,
            completed = self.completed.len() + 1,
            total = self.total_dimensions,
            "Dimension complete"
        );
        self.completed.push(dimension);
        Ok(())
    }

    /// Progress snapshot for the given frequency step of the given test point
    pub fn live_update(
        &self,
        current_frequency_index: usize,
        current_trial_index: usize,
        dimension: &DimensionId,
    ) -> Result<StatusReport> {
        self.ensure_active("live_update")?;
        let dimension_trial_count = self.dimension_trial_count(dimension)?;
        if self.completed.contains(dimension) {
            return Err(SweepError::DimensionAlreadyCompleted(dimension.clone()));
        }
        if current_frequency_index >= self.frequency_count {
            return Err(SweepError::IndexOutOfRange {
                what: "frequency",
                index: current_frequency_index,
                len: self.frequency_count,
            });
        }
        if current_trial_index >= dimension_trial_count {
            return Err(SweepError::IndexOutOfRange {
                what: "trial",
                index: current_trial_index,
                len: dimension_trial_count,
            });
        }

        let completed_trials = self.frequency_count * current_trial_index
            + current_frequency_index
            + self.completed_base;
        let (_, elapsed) = self.elapsed_seconds();

        let remaining_minutes = if completed_trials == 0 {
            None
        } else {
            let estimated_total = elapsed / completed_trials as f64 * self.total_trials as f64;
            Some(ceil_minutes(estimated_total - elapsed))
        };

        Ok(StatusReport {
            mode: self.mode,
            dimension: dimension.clone(),
            dimension_ordinal: self.completed.len() + 1,
            total_dimensions: self.total_dimensions,
            trial_ordinal: current_trial_index + 1,
            dimension_trial_count,
            frequency_ordinal: current_frequency_index + 1,
            frequency_count: self.frequency_count,
            completed_trials,
            total_trials: self.total_trials,
            elapsed_minutes: round_minutes(elapsed),
            remaining_minutes,
        })
    }

    fn close(&mut self, op: &'static str) -> Result<SummaryReport> {
        self.ensure_active(op)?;
        let (finished_at, elapsed) = self.elapsed_seconds();
        self.phase = Phase::Complete;

        if self.completed.len() < self.total_dimensions {
            tracing::warn!(
                completed = self.completed.len(),
                total = self.total_dimensions,
                "Final report issued before every dimension was registered"
            );
        }

        Ok(SummaryReport {
            mode: self.mode,
            total_dimensions: self.total_dimensions,
            frequency_count: self.frequency_count,
            total_trials: self.total_trials,
            started_at: self.origin_time,
            finished_at,
            elapsed_minutes: ceil_minutes(elapsed),
            notification: NotificationOutcome::NotRequested,
        })
    }

    /// Close the sweep and summarize it without contacting the notifier.
    ///
    /// Callers that print or save the summary before a slow delivery use this,
    /// then [`send_notification`](Self::send_notification).
    pub fn finish(&mut self) -> Result<SummaryReport> {
        self.close("finish")
    }

    /// Hand the summary of a finished sweep to the attached sink, once.
    ///
    /// A failed or missing transport is logged and returned as an outcome,
    /// never as an error.
    pub fn send_notification(&mut self, report: &SummaryReport) -> Result<NotificationOutcome> {
        if self.phase == Phase::Active {
            return Err(SweepError::NotFinished("send_notification"));
        }
        if self.notified {
            return Err(SweepError::NotificationAlreadySent);
        }
        self.notified = true;

        Ok(match &self.notifier {
            None => {
                tracing::warn!("Notification requested but no sink is configured");
                NotificationOutcome::Failed("no notification sink configured".to_string())
            }
            Some(sink) => match sink.send(COMPLETION_SUBJECT, &summary_line(report)) {
                Ok(()) => NotificationOutcome::Delivered,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to send completion notification");
                    NotificationOutcome::Failed(e.to_string())
                }
            },
        })
    }

    /// Close the sweep, summarize it and, with `notify` set, send the
    /// summary sentence to the attached sink.
    pub fn final_report(&mut self, notify: bool) -> Result<SummaryReport> {
        let mut report = self.close("final_report")?;
        if notify {
            report.notification = self.send_notification(&report)?;
        }
        Ok(report)
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for SweepRuntime<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepRuntime")
            .field("mode", &self.mode)
            .field("frequency_count", &self.frequency_count)
            .field("total_dimensions", &self.total_dimensions)
            .field("total_trials", &self.total_trials)
            .field("completed", &self.completed)
            .field("origin_time", &self.origin_time)
            .field("clock", &self.clock)
            .field("notified", &self.notified)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
