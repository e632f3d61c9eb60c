//! Persisting sweep results.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jiff::tz::TimeZone;

use crate::driver::SweepOutcome;

#[derive(Debug)]
pub enum OutputError {
    Io(io::Error),
    Serialize(String),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "failed to write results: {}", e),
            OutputError::Serialize(msg) => write!(f, "failed to serialize results: {}", msg),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Serialize(_) => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

/// Publish `content` as `{dir}/{stem}.yaml`, or `{stem}-n.yaml` when that
/// name is taken. Never overwrites an existing file.
///
/// The content is written to a temporary sibling first and then hard-linked
/// under the final name, so the file appears complete and two writers can't
/// claim the same name.
pub fn publish_new(dir: &Path, stem: &str, content: &str) -> io::Result<PathBuf> {
    let temp_path = dir.join(format!(".{stem}.{}.tmp", std::process::id()));
    fs::write(&temp_path, content)?;

    let mut n = 0;
    let published = loop {
        let path = match n {
            0 => dir.join(format!("{stem}.yaml")),
            n => dir.join(format!("{stem}-{n}.yaml")),
        };
        match fs::hard_link(&temp_path, &path) {
            Ok(()) => break Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => break Err(e),
        }
    };

    fs::remove_file(&temp_path)?;
    published
}

/// Save a finished sweep as YAML under `output_dir`, named after the local
/// time the sweep finished. Returns the written path.
pub fn write_outcome(outcome: &SweepOutcome, output_dir: &Path) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(output_dir)?;

    let yaml =
        serde_saphyr::to_string(outcome).map_err(|e| OutputError::Serialize(e.to_string()))?;
    let stamp = outcome
        .summary
        .finished_at
        .to_zoned(TimeZone::system())
        .strftime("%Y-%m-%d_%H%M")
        .to_string();
    let path = publish_new(output_dir, &format!("sweep-{stamp}"), &yaml)?;

    tracing::info!(path = %path.display(), "Saved sweep results");
    Ok(path)
}
