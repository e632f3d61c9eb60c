use std::fmt;

use crate::model::DimensionId;

/// Errors raised by sweep bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub enum SweepError {
    /// The sweep cannot be built from this specification (empty domain,
    /// too few variables for pairing, zero frequency steps)
    InvalidSpecification(String),
    /// A dimension was registered as complete twice
    DuplicateDimension(DimensionId),
    /// A tracking call arrived after the final report
    PostCompletionUse(&'static str),
    /// A closing call arrived while the sweep was still running
    NotFinished(&'static str),
    /// The completion notification was already handed to the sink
    NotificationAlreadySent,
    /// The identifier names a variable that is not swept, or its shape does
    /// not match the sweep mode
    UnknownDimension(DimensionId),
    /// Progress was reported for a dimension that is already registered
    DimensionAlreadyCompleted(DimensionId),
    /// A frequency or trial index lies outside its domain
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidSpecification(msg) => {
                write!(f, "invalid sweep specification: {msg}")
            }
            SweepError::DuplicateDimension(id) => {
                write!(f, "dimension {id} was already registered as complete")
            }
            SweepError::PostCompletionUse(op) => {
                write!(f, "{op} called after the final report")
            }
            SweepError::NotFinished(op) => {
                write!(f, "{op} called before the sweep was finished")
            }
            SweepError::NotificationAlreadySent => {
                write!(f, "the completion notification was already sent")
            }
            SweepError::UnknownDimension(id) => {
                write!(f, "dimension {id} is not part of this sweep")
            }
            SweepError::DimensionAlreadyCompleted(id) => {
                write!(f, "dimension {id} is already complete")
            }
            SweepError::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} out of range (0..{len})")
            }
        }
    }
}

impl std::error::Error for SweepError {}

/// Errors from a notification transport
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// The transport could not be reached or failed mid-delivery
    Transport(String),
    /// The transport refused the message
    Rejected(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::Transport(msg) => write!(f, "notification transport failed: {msg}"),
            NotificationError::Rejected(msg) => write!(f, "notification rejected: {msg}"),
        }
    }
}

impl std::error::Error for NotificationError {}

/// Firing-rate data that does not line up across frequency steps
#[derive(Debug, Clone, PartialEq)]
pub enum RateError {
    /// A category reported a different number of units than before
    UnitCountMismatch {
        category: String,
        expected: usize,
        found: usize,
    },
    /// A category appeared or disappeared between frequency steps
    CategoryMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateError::UnitCountMismatch {
                category,
                expected,
                found,
            } => write!(
                f,
                "category `{category}` reported {found} units, expected {expected}"
            ),
            RateError::CategoryMismatch { expected, found } => write!(
                f,
                "categories changed between frequency steps: expected {expected:?}, found {found:?}"
            ),
        }
    }
}

impl std::error::Error for RateError {}

pub type Result<T> = std::result::Result<T, SweepError>;
