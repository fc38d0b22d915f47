//! Process-wide `tracing` subscriber setup.
//!
//! The engine only emits events (`debug!` for selection and cleaning counts,
//! `warn!` for degenerate rejections). Hosts call [`init_logging`] once and
//! keep the returned [`LoggingHandle`] alive; [`LoggingHandle::shutdown`]
//! flushes the file sink.
//!
//! The filter comes from `RUST_LOG` when set, otherwise
//! `u_scatter={level}`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ScatterError;

/// Log files above this size are trimmed before opening (5 MB).
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Most recent bytes kept when trimming (1 MB).
const KEEP_SIZE: u64 = 1024 * 1024;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level for `u_scatter` targets. Default: `info`.
    pub level: String,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
    /// ANSI colours. Ignored for file output.
    pub ansi: bool,
    /// Include the event target (module path).
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            ansi: true,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<(), ScatterError> {
        if LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(ScatterError::InvalidOption {
                name: "logging.level".into(),
                reason: format!("expected one of {}, got '{}'", LEVELS.join(", "), self.level),
            })
        }
    }
}

/// Trims the log to its most recent [`KEEP_SIZE`] bytes once it exceeds
/// [`MAX_LOG_SIZE`].
fn rotate_log_if_needed(log_path: &Path) -> io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }
    let size = fs::metadata(log_path)?.len();
    if size <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(size.saturating_sub(KEEP_SIZE)))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    drop(file);

    // start on a line boundary
    let skip = buffer
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- log trimmed (older entries removed) ---\n")?;
    file.write_all(&buffer[skip..])
}

// ── Shared file writer ────────────────────────────────────────────────

type SharedFile = Arc<Mutex<File>>;

fn lock(file: &SharedFile) -> io::Result<std::sync::MutexGuard<'_, File>> {
    file.lock()
        .map_err(|_| io::Error::other("log file lock poisoned"))
}

#[derive(Clone)]
struct LogWriterFactory {
    file: SharedFile,
}

struct LogWriter {
    file: SharedFile,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.file)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.file)?.flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: Arc::clone(&self.file),
        }
    }
}

// ── Initialisation ────────────────────────────────────────────────────

/// Keeps the sink alive; flushes on [`shutdown`](Self::shutdown) and on drop.
#[derive(Debug)]
#[must_use = "dropping the handle flushes the log sink"]
pub struct LoggingHandle {
    file: Option<SharedFile>,
    path: Option<PathBuf>,
}

impl LoggingHandle {
    /// Log file path, if logging to a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flushes and releases the sink.
    pub fn shutdown(mut self) -> Result<(), ScatterError> {
        let result = self.flush();
        self.file = None;
        result
    }

    fn flush(&self) -> Result<(), ScatterError> {
        match &self.file {
            Some(file) => lock(file)
                .and_then(|mut f| f.flush())
                .map_err(|e| ScatterError::Logging(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Installs the global subscriber.
///
/// Fails with [`ErrorKind::Logging`](crate::error::ErrorKind::Logging) if a
/// global subscriber is already set or the filter does not parse.
pub fn init_logging(config: &LogConfig) -> Result<LoggingHandle, ScatterError> {
    config.validate()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("u_scatter={}", config.level.to_ascii_lowercase()))
            .map_err(|e| ScatterError::Logging(e.to_string()))?,
    };

    let (writer, file, ansi) = match &config.file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            if let Err(e) = rotate_log_if_needed(path) {
                eprintln!("warning: failed to trim log file {}: {e}", path.display());
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let shared: SharedFile = Arc::new(Mutex::new(file));
            let factory = LogWriterFactory {
                file: Arc::clone(&shared),
            };
            (BoxMakeWriter::new(factory), Some(shared), false)
        }
        None => (BoxMakeWriter::new(io::stderr), None, config.ansi),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(config.with_target)
                .with_thread_ids(false),
        )
        .try_init()
        .map_err(|e| ScatterError::Logging(e.to_string()))?;

    tracing::info!(
        level = %config.level,
        file = ?config.file,
        "u-scatter logging initialized"
    );
    Ok(LoggingHandle {
        file,
        path: config.file.clone(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
