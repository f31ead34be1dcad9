//! # Logging
//!
//! This module builds the `tracing` subscriber the backend logs through and
//! keeps the handles needed to change it while the process runs.
//!
//! ## Layers
//!
//! 1.  **Level filter**: an `EnvFilter` behind a `reload` layer. The base
//!     directive is the configured [`LogLevel`]; per-target directives from
//!     `RUST_LOG` (for example `hyper=warn`) are appended so they still apply.
//!     Bare levels in `RUST_LOG` are ignored so the `-l` flag stays
//!     authoritative. [`Logging::set_level`] swaps the filter in place.
//!
//! 2.  **Stderr**: active while no log file is set. ANSI colors enabled.
//!
//! 3.  **Log file**: the file is opened in append mode and wrapped in
//!     `tracing_appender::non_blocking`, so lines are written by a worker
//!     thread after the log call returns. ANSI colors disabled. Readers that
//!     need to observe a line must poll. Dropping the sink flushes it and
//!     closes the file.
//!
//! 4.  **Extra writer** (optional): receives a copy of every line, for
//!     forwarding logs to a client connection.
//!
//! The stderr and file layers share one switch, so exactly one of them writes
//! at any time and the switch can be flipped without rebuilding the subscriber.
//! Each event is still formatted by both layers, and the inactive one writes
//! into `io::sink()`. ANSI is fixed per `fmt` layer, and the file must not
//! receive escape codes, so the two layers are kept apart at that cost.

use crate::{config::LogLevel, error::LoggingError};
use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
};
use tracing::{Dispatch, level_filters::LevelFilter};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        MakeWriter, layer,
        writer::{EitherWriter, OptionalWriter},
    },
    prelude::*,
    reload,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Where formatted log lines currently go.
enum Sink {
    Stderr,
    File {
        path: PathBuf,
        writer: NonBlocking,
        // Dropping the guard flushes pending lines and joins the worker.
        _guard: WorkerGuard,
    },
}

impl Sink {
    fn open(path: &Path) -> Result<Self, LoggingError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggingError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            })?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        Ok(Sink::File {
            path: path.to_path_buf(),
            writer,
            _guard: guard,
        })
    }
}

type SharedSink = Arc<RwLock<Sink>>;

/// Writer for the stderr layer; silent while a file is active.
struct StderrWriter(SharedSink);

impl<'a> MakeWriter<'a> for StderrWriter {
    type Writer = OptionalWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        match &*self.0.read().unwrap_or_else(PoisonError::into_inner) {
            Sink::Stderr => EitherWriter::A(io::stderr()),
            Sink::File { .. } => EitherWriter::B(io::sink()),
        }
    }
}

/// Writer for the file layer; silent while logging to stderr.
struct FileWriter(SharedSink);

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = OptionalWriter<NonBlocking>;

    fn make_writer(&'a self) -> Self::Writer {
        match &*self.0.read().unwrap_or_else(PoisonError::into_inner) {
            Sink::File { writer, .. } => EitherWriter::A(writer.clone()),
            Sink::Stderr => EitherWriter::B(io::sink()),
        }
    }
}

/// Filter for `level`, extended with the per-target directives of `RUST_LOG`.
fn level_filter(level: LogLevel) -> EnvFilter {
    let targets: Vec<String> = std::env::var("RUST_LOG")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty() && directive.parse::<LevelFilter>().is_err())
        .map(String::from)
        .collect();

    if targets.is_empty() {
        return EnvFilter::new(level.as_str());
    }

    EnvFilter::try_new(format!("{},{}", level.as_str(), targets.join(",")))
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Handle to the log subscriber owned by a [`crate::config::Config`].
///
/// Until [`Logging::configure`] runs, the other methods are no-ops.
#[derive(Default)]
pub struct Logging {
    installed: Option<Installed>,
}

struct Installed {
    dispatch: Dispatch,
    filter: FilterHandle,
    sink: SharedSink,
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("configured", &self.is_configured())
            .field("log_file", &self.log_file())
            .finish()
    }
}

impl Logging {
    /// Builds a fresh subscriber, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::OpenLogFile`] if `log_path` cannot be opened.
    pub fn configure(
        &mut self,
        level: LogLevel,
        log_path: Option<&Path>,
        extra: Option<Box<dyn Write + Send>>,
    ) -> Result<(), LoggingError> {
        let sink = match log_path {
            Some(path) => Sink::open(path)?,
            None => Sink::Stderr,
        };
        let sink: SharedSink = Arc::new(RwLock::new(sink));

        let (filter, filter_handle) = reload::Layer::new(level_filter(level));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(layer().with_writer(StderrWriter(sink.clone())).with_ansi(true))
            .with(layer().with_writer(FileWriter(sink.clone())).with_ansi(false))
            .with(extra.map(|writer| layer().with_writer(Mutex::new(writer)).with_ansi(false)));

        self.installed = Some(Installed {
            dispatch: Dispatch::new(subscriber),
            filter: filter_handle,
            sink,
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.installed.is_some()
    }

    pub fn dispatch(&self) -> Option<&Dispatch> {
        self.installed.as_ref().map(|installed| &installed.dispatch)
    }

    /// Makes the subscriber the process-wide default.
    ///
    /// # Errors
    ///
    /// [`LoggingError::NotConfigured`] before [`Logging::configure`], and
    /// [`LoggingError::AlreadyInstalled`] if a global default already exists.
    pub fn install_global(&self) -> Result<(), LoggingError> {
        let dispatch = self.dispatch().ok_or(LoggingError::NotConfigured)?;
        tracing::dispatcher::set_global_default(dispatch.clone())
            .map_err(|_| LoggingError::AlreadyInstalled)
    }

    /// Applies a new level to the live filter.
    pub fn set_level(&self, level: LogLevel) {
        let Some(installed) = &self.installed else {
            return;
        };
        if let Err(error) = installed.filter.reload(level_filter(level)) {
            eprintln!("codeai-backend: failed to change log level to {level}: {error}");
        }
    }

    /// Switches output to a newly opened file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::OpenLogFile`] and keeps the current sink if the
    /// file cannot be opened.
    pub fn log_to_file(&self, path: &Path) -> Result<(), LoggingError> {
        let Some(installed) = &self.installed else {
            return Ok(());
        };
        let replacement = Sink::open(path)?;
        let previous = std::mem::replace(
            &mut *installed.sink.write().unwrap_or_else(PoisonError::into_inner),
            replacement,
        );
        // Lock released above; flushing the old file joins its worker.
        drop(previous);
        Ok(())
    }

    /// Closes the current log file, if any, and switches output to stderr.
    pub fn log_to_stderr(&self) {
        let Some(installed) = &self.installed else {
            return;
        };
        let previous = std::mem::replace(
            &mut *installed.sink.write().unwrap_or_else(PoisonError::into_inner),
            Sink::Stderr,
        );
        drop(previous);
    }

    pub fn is_logging_to_file(&self) -> bool {
        self.log_file().is_some()
    }

    /// Path of the open log file.
    pub fn log_file(&self) -> Option<PathBuf> {
        let installed = self.installed.as_ref()?;
        match &*installed.sink.read().unwrap_or_else(PoisonError::into_inner) {
            Sink::File { path, .. } => Some(path.clone()),
            Sink::Stderr => None,
        }
    }
}
