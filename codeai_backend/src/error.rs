//! Error types for the bootstrap

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a bootstrap with [`crate::shell::ParseOutcome::Failure`].
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    EnvFile(#[from] EnvFileError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Errors raised while loading a `-c` environment file.
#[derive(Error, Debug)]
pub enum EnvFileError {
    #[error("Failed to read environment file '{path:?}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line {line} in environment file '{path:?}': {content:?} (expected KEY=VALUE)")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

/// Errors raised while wiring the log subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file '{path:?}': {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global log subscriber is already installed")]
    AlreadyInstalled,

    #[error("Logging has not been configured")]
    NotConfigured,
}
