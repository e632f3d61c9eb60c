//! Data types shared by the sweep bookkeeping modules.

mod reports;
mod spec;

pub use reports::*;
pub use spec::*;
