//! Logging setup.
//!
//! Logs go to an optional stderr layer and an optional non-blocking file
//! layer. `RUST_LOG` takes precedence over the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::{FormatTime, OffsetTime, SystemTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "navcompiler.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `navcompiler=debug`.
    pub level: String,
    /// Directory for the log file; `None` disables file logging.
    pub directory: Option<PathBuf>,
    pub file_name: String,
    /// Also log to stderr.
    pub stderr: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_name: LOG_FILE_NAME.to_string(),
            stderr: true,
        }
    }
}

/// Keeps the file writer alive; flushes pending lines on drop.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard {
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Install the global subscriber.
///
/// Call before spawning threads: the local UTC offset can only be determined
/// reliably while the process is single threaded. If it cannot, timestamps
/// fall back to UTC.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&options.level)?;

    let (file_writer, worker, log_file) = match &options.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
                path: directory.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(directory, &options.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(writer),
                Some(guard),
                Some(directory.join(&options.file_name)),
            )
        }
        None => (None, None, None),
    };

    match OffsetTime::local_rfc_3339() {
        Ok(timer) => install(filter, timer, options.stderr, file_writer)?,
        Err(_) => install(filter, SystemTime, options.stderr, file_writer)?,
    }

    Ok(LoggingGuard {
        _worker: worker,
        log_file,
    })
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::Filter {
        filter: level.to_string(),
        reason: e.to_string(),
    })
}

fn install<T>(
    filter: EnvFilter,
    timer: T,
    stderr: bool,
    file_writer: Option<NonBlocking>,
) -> Result<(), LoggingError>
where
    T: FormatTime + Clone + Send + Sync + 'static,
{
    let stderr_layer = stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(timer.clone())
            .with_target(false)
    });

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_timer(timer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
