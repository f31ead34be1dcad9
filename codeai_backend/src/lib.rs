//! # CodeAI Backend Bootstrap
//!
//! Library half of the `codeai-backend` binary. It turns the process arguments
//! into a validated [`config::Config`], wires the `tracing` subscriber that the
//! rest of the service logs through, and reports informational exits
//! (`-v`, `-licenses`, `-h`) as values instead of errors.
//!
//! ## Modules
//!
//! - **`shell`**: flag parsing ([`shell::parse_flags`]) and the binary entry point.
//! - **`config`**: the explicit runtime configuration object and the `-c` env file loader.
//! - **`utils::logging`**: subscriber construction, live level changes and the file sink.
//! - **`error`**: error types shared by the modules above.
//! - **`constants`**: program name, version and license text.
//!
//! ## Example
//!
//! ```rust
//! use codeai_backend::config::{Config, LogLevel};
//! use codeai_backend::shell::{ParseOutcome, parse_flags};
//!
//! let mut config = Config::new();
//! let outcome = parse_flags(&["codeai-backend", "-l", "debug"], &mut config);
//! assert!(matches!(outcome, ParseOutcome::Success));
//! assert_eq!(config.log_level(), LogLevel::Debug);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod shell;
pub mod test_utils;
pub mod utils;

pub use config::Config;
pub use error::{BootstrapError, EnvFileError, LoggingError};
pub use shell::{ParseOutcome, parse_flags};
