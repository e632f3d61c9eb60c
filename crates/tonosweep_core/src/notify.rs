//! Completion notifications.
//!
//! The sweep runtime only needs a way to hand off a subject and body once the
//! run is over; transports live with the application.

use crate::error::NotificationError;

/// Subject line of the completion message
pub const COMPLETION_SUBJECT: &str = "Your Simulations are Complete";

/// Best-effort, fire-once message delivery
pub trait NotificationSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError>;
}

impl<F> NotificationSink for F
where
    F: Fn(&str, &str) -> Result<(), NotificationError>,
{
    fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        self(subject, body)
    }
}

/// Writes the message to the log instead of delivering it anywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        tracing::info!(subject, body, "Sweep notification");
        Ok(())
    }
}
