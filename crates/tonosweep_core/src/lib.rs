//! Sweep bookkeeping for tonotopic tuning experiments
//!
//! This crate tracks progress through parameter sweeps that drive an external
//! spiking-network simulator. It provides:
//! - Trial counting for single-variable and pairwise sweeps
//! - A progress runtime with elapsed time and linear ETA estimates
//! - Fixed-width boxed banners for live status and the final summary
//! - A notification hook fired once when the sweep finishes
//! - Tuning-width statistics over per-frequency firing rates
//!
//! # Example
//!
//! ```
//! use tonosweep_core::{DimensionId, SweepMode, SweepRuntime, SweepSpecification};
//!
//! let spec = SweepSpecification::new()
//!     .with("x", vec![1.into(), 2.into(), 3.into()])
//!     .with("y", vec![10.into(), 20.into()]);
//! let mut runtime = SweepRuntime::new(spec, 5, SweepMode::Single).unwrap();
//! assert_eq!(runtime.total_trials(), 25);
//!
//! runtime.register_completion(DimensionId::single("x")).unwrap();
//! let status = runtime.live_update(2, 1, &DimensionId::single("y")).unwrap();
//! assert_eq!(status.completed_trials, 22);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod counter;
pub mod error;
pub mod format;
pub mod notify;
pub mod runtime;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{NotificationError, RateError, SweepError};
pub use format::BoxStyle;
pub use model::{
    DimensionId, NotificationOutcome, StatusReport, SummaryReport, SweepMode, SweepSpecification,
    SweepValue,
};
pub use notify::{NotificationSink, TracingSink};
pub use runtime::{Clock, ManualClock, SweepRuntime, SystemClock};
