//! Tests for the sweep bookkeeping crate
//!
//! Tests are organized by topic:
//! - `counter` - Dimension and trial counting
//! - `runtime` - Completion tracking, live estimates, final report
//! - `scenarios` - End-to-end sweeps walked the way a driver walks them

mod runtime;

use crate::model::{SweepSpecification, SweepValue};

/// Integer test values
pub(crate) fn ints(values: &[i64]) -> Vec<SweepValue> {
    values.iter().map(|&v| SweepValue::Integer(v)).collect()
}

/// The two-variable specification used across the scenarios: x has three
/// values, y has two
pub(crate) fn xy_spec() -> SweepSpecification {
    SweepSpecification::new()
        .with("x", ints(&[1, 2, 3]))
        .with("y", ints(&[10, 20]))
}
