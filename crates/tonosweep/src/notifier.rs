//! Notification transports for the end-of-sweep message.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tonosweep_core::{NotificationError, NotificationSink, TracingSink};

use crate::config::SinkConfig;
use crate::simulator::reap;

/// Appends each message to a spool file
#[derive(Debug, Clone)]
pub struct OutboxSink {
    path: PathBuf,
}

impl OutboxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NotificationSink for OutboxSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                NotificationError::Transport(format!("{}: {}", self.path.display(), e))
            })?;

        let message = format!(
            "Date: {}\nSubject: {}\n\n{}\n\n",
            jiff::Timestamp::now(),
            subject,
            body
        );
        file.write_all(message.as_bytes())
            .map_err(|e| NotificationError::Transport(e.to_string()))
    }
}

/// Pipes the body into an external command such as `mail`
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl NotificationSink for CommandSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        let args = self.args.iter().map(|a| a.replace("{subject}", subject));
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| NotificationError::Transport(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(body.as_bytes())
        {
            drop(stdin);
            reap(&mut child);
            return Err(NotificationError::Transport(format!("{}: {}", self.program, e)));
        }

        let output = child
            .wait_with_output()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(NotificationError::Rejected(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// Build the sink an experiment asks for
pub fn build_sink(config: &SinkConfig) -> Box<dyn NotificationSink> {
    match config {
        SinkConfig::Outbox { path } => Box::new(OutboxSink::new(path.clone())),
        SinkConfig::Command { program, args } => {
            Box::new(CommandSink::new(program.clone(), args.clone()))
        }
        SinkConfig::Log => Box::new(TracingSink),
    }
}
