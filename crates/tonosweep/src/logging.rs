use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file name inside the data directory
pub const LOG_FILE: &str = "tonosweep.log";
/// Maximum log file size before rotation (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Size to keep after rotation (1 MB of most recent logs)
const KEEP_SIZE: u64 = 1024 * 1024;

/// The sweep log, shared by every writer the subscriber hands out.
///
/// Long experiments append to the same file run after run, so each open
/// trims it back to its newest `keep` bytes once it passes `max`, and marks
/// the start of the new session.
#[derive(Clone)]
struct SweepLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl SweepLog {
    fn open(path: PathBuf, max: u64, keep: u64) -> io::Result<(Self, u64)> {
        let trimmed = trim_to_recent(&path, max, keep)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok((
            Self {
                path,
                file: Arc::new(Mutex::new(file)),
            },
            trimmed,
        ))
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("sweep log lock poisoned"))?;
        f(&mut file)
    }

    /// Separator line between runs, naming the experiment being run
    fn begin_session(&self, experiment: &Path) -> io::Result<()> {
        let header = format!(
            "=== tonosweep session {} experiment={} ===\n",
            jiff::Timestamp::now(),
            experiment.display()
        );
        self.with_file(|file| file.write_all(header.as_bytes()))
    }
}

/// Drop everything but the newest `keep` bytes (cut at a line boundary) when
/// the file is larger than `max`. Returns the number of bytes removed.
fn trim_to_recent(path: &Path, max: u64, keep: u64) -> io::Result<u64> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    if size <= max {
        return Ok(0);
    }

    let mut recent = Vec::new();
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(size.saturating_sub(keep)))?;
    file.read_to_end(&mut recent)?;
    drop(file);

    let start = recent
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let kept = &recent[start..];

    let mut file = File::create(path)?;
    file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
    file.write_all(kept)?;
    Ok(size - kept.len() as u64)
}

struct SweepLogWriter(SweepLog);

impl Write for SweepLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.with_file(|file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for SweepLog {
    type Writer = SweepLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SweepLogWriter(self.clone())
    }
}

/// Initialize logging for one run of `experiment`, appending to
/// `{data_dir}/tonosweep.log`.
///
/// The terminal is reserved for the progress banners, so nothing is logged to
/// it. `RUST_LOG` overrides `level` when set. Returns the log file path.
pub fn init_logging(data_dir: &Path, level: &str, experiment: &Path) -> color_eyre::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let (log, trimmed) = match SweepLog::open(data_dir.join(LOG_FILE), MAX_LOG_SIZE, KEEP_SIZE) {
        Ok(opened) => opened,
        Err(e) => {
            eprintln!("Warning: Failed to rotate log file: {}", e);
            SweepLog::open(data_dir.join(LOG_FILE), u64::MAX, KEEP_SIZE)?
        }
    };
    log.begin_session(experiment)?;
    let log_path = log.path.clone();

    let default_filter = format!("tonosweep={level},tonosweep_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(log)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    if trimmed > 0 {
        tracing::info!(bytes = trimmed, "Rotated sweep log");
    }
    tracing::info!(
        log_path = %log_path.display(),
        experiment = %experiment.display(),
        "Logging initialized"
    );
    Ok(log_path)
}
