//! # Shell Module
//!
//! Entry point and CLI logic for the `codeai-backend` binary.
//!
//! ## Sub-modules
//!
//! - **`cli`**: argument definition, [`parse_flags`], bootstrap and run loop
//! - **`outcome`**: [`ParseOutcome`], the result of a bootstrap

pub mod cli;
pub mod outcome;

pub use cli::{Cli, bootstrap, normalize_args, parse_flags, run, usage};
pub use outcome::ParseOutcome;
