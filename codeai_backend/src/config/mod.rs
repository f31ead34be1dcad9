//! # Runtime Configuration
//!
//! [`Config`] is the single object holding the settings the bootstrapper
//! derives from the command line. It is created once in `main`, filled in by
//! [`crate::shell::parse_flags`], and then handed by reference to whatever
//! needs it. Nothing here is global: two `Config` values never share state,
//! which keeps tests independent of each other.
//!
//! ## Contents
//!
//! - **Log settings**: level, optional log file path, and the [`Logging`]
//!   handle that applies both to a live subscriber once one is configured.
//! - **Output format**: how results are rendered for clients (`md` or `html`).
//! - **Error reporting**: opt-in flag, off by default.
//! - **Environment**: `KEY=VALUE` pairs loaded from a `-c` file. They are kept
//!   in the config and only reach the process environment through
//!   [`Config::apply_env`] or a child process through [`Config::apply_env_to`].

pub mod env_file;

use crate::{
    error::{EnvFileError, LoggingError},
    utils::logging::Logging,
};
use std::{
    collections::BTreeMap,
    fmt,
    io::Write,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

/// Name of the markdown output format on the command line.
pub const FORMAT_MD: &str = "md";
/// Name of the HTML output format on the command line.
pub const FORMAT_HTML: &str = "html";

/// Severity threshold for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Canonical lowercase name, also a valid `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "fatal" | "panic" => Ok(LogLevel::Error),
            "off" | "disabled" | "none" => Ok(LogLevel::Off),
            other => Err(format!(
                "invalid log level '{other}' (expected one of: trace, debug, info, warn, error, off)"
            )),
        }
    }
}

/// Rendering format for results returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Md,
    Html,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Md => FORMAT_MD,
            OutputFormat::Html => FORMAT_HTML,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration of the backend process.
#[derive(Debug, Default)]
pub struct Config {
    log_level: LogLevel,
    log_path: Option<PathBuf>,
    format: OutputFormat,
    error_reporting: bool,
    env: BTreeMap<String, String>,
    logging: Logging,
}

impl Config {
    /// Creates a configuration with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Sets the log level, reloading the live filter if logging is configured.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
        self.logging.set_level(level);
    }

    /// Path of the log file, `None` when logging goes to stderr.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Enables file logging at `path`.
    ///
    /// When logging is already configured the file is opened right away and
    /// replaces the current sink.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::OpenLogFile`] if the file cannot be opened. The
    /// previous path and sink stay active in that case.
    pub fn set_log_path(&mut self, path: impl Into<PathBuf>) -> Result<(), LoggingError> {
        let path = path.into();
        if self.logging.is_configured() {
            self.logging.log_to_file(&path)?;
        }
        self.log_path = Some(path);
        Ok(())
    }

    /// Closes the log file and routes log output back to stderr.
    pub fn disable_logging_to_file(&mut self) {
        self.log_path = None;
        self.logging.log_to_stderr();
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn is_error_reporting_enabled(&self) -> bool {
        self.error_reporting
    }

    pub fn set_error_reporting(&mut self, enabled: bool) {
        self.error_reporting = enabled;
    }

    /// Variables loaded from environment files, in key order.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Loads `KEY=VALUE` pairs from `path` into this configuration.
    ///
    /// Later keys overwrite earlier ones, both within the file and across
    /// repeated loads. The process environment is not touched.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvFileError`] if the file cannot be read or contains a
    /// malformed line. Nothing is merged in that case.
    pub fn load_env_file(&mut self, path: impl AsRef<Path>) -> Result<(), EnvFileError> {
        let path = path.as_ref();
        let entries = env_file::load(path)?;
        tracing::debug!(
            "Loaded {} variable(s) from {}",
            entries.len(),
            path.display()
        );
        self.env.extend(entries);
        Ok(())
    }

    /// Exports the loaded variables into the process environment,
    /// overwriting existing values.
    ///
    /// Call this once during startup, before any other thread exists.
    pub fn apply_env(&self) {
        for (key, value) in &self.env {
            // SAFETY: startup runs single-threaded; no other thread reads or
            // writes the environment while this loop runs.
            unsafe { std::env::set_var(key, value) };
        }
    }

    /// Adds the loaded variables to a child process environment.
    pub fn apply_env_to<'a>(&self, command: &'a mut Command) -> &'a mut Command {
        command.envs(&self.env)
    }

    /// Builds the log subscriber from the current settings.
    ///
    /// Output goes to the log file if a path is set, otherwise to stderr.
    /// `extra` receives a copy of every line when given.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::OpenLogFile`] if the log file cannot be opened.
    pub fn configure_logging(
        &mut self,
        extra: Option<Box<dyn Write + Send>>,
    ) -> Result<(), LoggingError> {
        self.logging
            .configure(self.log_level, self.log_path.as_deref(), extra)
    }

    /// The configured subscriber, for scoped use with
    /// [`tracing::dispatcher::with_default`].
    pub fn log_dispatch(&self) -> Option<&tracing::Dispatch> {
        self.logging.dispatch()
    }

    /// Makes the configured subscriber the process-wide default.
    ///
    /// # Errors
    ///
    /// Fails if logging is not configured or another global subscriber exists.
    pub fn install_global_logging(&self) -> Result<(), LoggingError> {
        self.logging.install_global()
    }

    pub fn is_logging_to_file(&self) -> bool {
        self.logging.is_logging_to_file()
    }
}
