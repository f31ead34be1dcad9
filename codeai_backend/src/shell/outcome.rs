//! Result of a bootstrap run.

use crate::error::BootstrapError;

/// What the caller should do after [`crate::shell::parse_flags`].
#[derive(Debug)]
pub enum ParseOutcome {
    /// Flags applied; continue starting the service.
    Success,
    /// `-h` was given; print the usage and exit successfully.
    Help(String),
    /// `-licenses` was given; print the license text and exit successfully.
    Licenses(String),
    /// `-v` was given; print the version and exit successfully.
    VersionRequested(&'static str),
    /// The arguments were rejected or a setting could not be applied.
    Failure {
        usage: String,
        cause: BootstrapError,
    },
}

impl ParseOutcome {
    /// Text to show the user. Empty for [`ParseOutcome::Success`] and
    /// [`ParseOutcome::VersionRequested`].
    pub fn output(&self) -> &str {
        match self {
            ParseOutcome::Success | ParseOutcome::VersionRequested(_) => "",
            ParseOutcome::Help(usage) | ParseOutcome::Failure { usage, .. } => usage,
            ParseOutcome::Licenses(text) => text,
        }
    }

    /// True for outcomes that end the process without being a failure.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            ParseOutcome::Help(_) | ParseOutcome::Licenses(_) | ParseOutcome::VersionRequested(_)
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success)
    }

    /// The error behind a [`ParseOutcome::Failure`].
    pub fn error(&self) -> Option<&BootstrapError> {
        match self {
            ParseOutcome::Failure { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Process exit code, or `None` when the service should keep starting.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ParseOutcome::Success => None,
            ParseOutcome::Help(_)
            | ParseOutcome::Licenses(_)
            | ParseOutcome::VersionRequested(_) => Some(0),
            ParseOutcome::Failure { .. } => Some(2),
        }
    }
}
