//! # CodeAI Backend CLI
//!
//! Command-line definition, the flag bootstrapper and the binary entry point.
//!
//! Flags use the single-dash spelling of the original tool (`-reportErrors`,
//! `-licenses`). They are rewritten to clap's double-dash long form before
//! parsing, so both spellings work.

use super::outcome::ParseOutcome;
use crate::{
    config::{Config, LogLevel, OutputFormat},
    constants::{PROGRAM_NAME, VERSION, license_text},
    error::BootstrapError,
};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, error::ErrorKind};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// Backend service for CodeAI language tooling.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "codeai-backend",
    about,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error or off
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        value_parser = LogLevel::from_str
    )]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(
        short = 'f',
        long = "log-file",
        value_name = "PATH",
        allow_hyphen_values = true
    )]
    pub log_file: Option<PathBuf>,

    /// Output format for results
    #[arg(
        short = 'o',
        long = "format",
        value_name = "FORMAT",
        value_enum,
        default_value_t = OutputFormat::Md
    )]
    pub format: OutputFormat,

    /// Load KEY=VALUE environment variables from this file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        allow_hyphen_values = true
    )]
    pub env_file: Option<PathBuf>,

    /// Enable error reporting
    #[arg(long = "reportErrors")]
    pub report_errors: bool,

    /// Print license information and exit
    #[arg(long)]
    pub licenses: bool,

    /// Print the version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Arguments from the first non-flag onwards; not interpreted
    #[arg(trailing_var_arg = true, hide = true)]
    pub remaining: Vec<String>,
}

/// Flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &[
    "-l",
    "-f",
    "-o",
    "-c",
    "--log-level",
    "--log-file",
    "--format",
    "--config",
];

impl Cli {
    /// Copies the parsed settings into `config`.
    ///
    /// Level, format and error reporting are always set (defaults included),
    /// so repeated runs with the same flags leave the same state. The log file
    /// and env file are only touched when given. The env file goes last; when
    /// it fails, the settings before it are already applied.
    pub fn apply(&self, config: &mut Config) -> Result<(), BootstrapError> {
        config.set_log_level(self.log_level);
        tracing::debug!("Log level set to {}", self.log_level);

        if let Some(path) = &self.log_file {
            config.set_log_path(path)?;
            tracing::debug!("Logging to file {}", path.display());
        }

        config.set_format(self.format);
        config.set_error_reporting(self.report_errors);

        if let Some(path) = &self.env_file {
            config.load_env_file(path)?;
        }
        if !self.remaining.is_empty() {
            tracing::debug!("Ignoring non-flag arguments: {:?}", self.remaining);
        }
        Ok(())
    }
}

/// Parses `args` and applies the result to `config`.
///
/// `args[0]` is the program name; it only appears in the usage header
/// `Usage of <program>:`. A repeated flag keeps its last value, and parsing
/// stops at the first non-flag argument. Invalid arguments leave `config`
/// untouched and informational flags (`-v`, `-licenses`, `-h`) never change
/// it. Otherwise the settings are applied in order by [`Cli::apply`], so a
/// failing `-f` or `-c` leaves the settings before it applied.
pub fn parse_flags<S: AsRef<str>>(args: &[S], config: &mut Config) -> ParseOutcome {
    let program = program_name(args.first().map(AsRef::as_ref));
    let argv = std::iter::once(program.clone())
        .chain(normalize_args(args.iter().skip(1).map(AsRef::as_ref)));

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(error) if error.kind() == ErrorKind::DisplayHelp => {
            return ParseOutcome::Help(usage(&program));
        }
        Err(error) => {
            return ParseOutcome::Failure {
                usage: usage(&program),
                cause: BootstrapError::Parse(describe(&error)),
            };
        }
    };

    if cli.version {
        return ParseOutcome::VersionRequested(VERSION);
    }
    if cli.licenses {
        return ParseOutcome::Licenses(license_text());
    }

    match cli.apply(config) {
        Ok(()) => ParseOutcome::Success,
        Err(cause) => ParseOutcome::Failure {
            usage: usage(&program),
            cause,
        },
    }
}

/// Usage text in the `Usage of <program>:` layout followed by the options.
pub fn usage(program: &str) -> String {
    let mut command = Cli::command().bin_name(program.to_owned());
    format!("Usage of {program}:\n{}", command.render_help())
}

fn program_name(arg0: Option<&str>) -> String {
    arg0.and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(PROGRAM_NAME)
        .to_owned()
}

/// Rewrites single-dash long flags (`-reportErrors`) to `--reportErrors`.
///
/// Single-letter flags, values of value-taking flags, `--` and everything
/// from the first non-flag argument on are passed through unchanged.
pub fn normalize_args<'a>(args: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut normalized = Vec::new();
    let mut expects_value = false;
    let mut passthrough = false;

    for arg in args {
        if passthrough || expects_value {
            expects_value = false;
            normalized.push(arg.to_owned());
            continue;
        }
        if arg == "--" || arg == "-" || !arg.starts_with('-') {
            passthrough = true;
            normalized.push(arg.to_owned());
            continue;
        }

        let arg = match arg.strip_prefix('-') {
            Some(rest)
                if !rest.starts_with('-')
                    && rest.split('=').next().is_some_and(|name| name.chars().count() > 1) =>
            {
                format!("--{rest}")
            }
            _ => arg.to_owned(),
        };
        expects_value = VALUE_FLAGS.contains(&arg.as_str());
        normalized.push(arg);
    }

    normalized
}

/// First line of clap's error message without the `error: ` prefix.
fn describe(error: &clap::Error) -> String {
    error
        .render()
        .to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error: ").to_owned())
        .unwrap_or_else(|| format!("{:?}", error.kind()))
}

/// Parses the process arguments and prepares logging and the environment.
///
/// Informational flags and parse failures print their text and exit the
/// process here. Runs before the async runtime starts, so exporting the `-c`
/// variables happens while the process is still single-threaded.
pub fn bootstrap() -> Result<Config> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::new();

    let outcome = parse_flags(&args, &mut config);
    match &outcome {
        ParseOutcome::Success => {}
        ParseOutcome::VersionRequested(version) => println!("{version}"),
        ParseOutcome::Help(text) | ParseOutcome::Licenses(text) => print!("{text}"),
        ParseOutcome::Failure { usage, cause } => eprint!("{cause}\n{usage}"),
    }
    if let Some(code) = outcome.exit_code() {
        std::process::exit(code);
    }

    config.apply_env();
    config
        .configure_logging(None)
        .context("Failed to configure logging")?;
    config
        .install_global_logging()
        .context("Failed to install logger")?;
    Ok(config)
}

/// Runs the service with a bootstrapped configuration until Ctrl-C.
pub async fn run(mut config: Config) -> Result<()> {
    tracing::info!(
        "{PROGRAM_NAME} {VERSION} starting (log level {}, format {}, error reporting {})",
        config.log_level(),
        config.format(),
        if config.is_error_reporting_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    if let Some(path) = config.log_path() {
        tracing::info!("Logging to {}", path.display());
    }
    if !config.env().is_empty() {
        tracing::info!("Exported {} variable(s) from config file", config.env().len());
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");
    config.disable_logging_to_file();
    Ok(())
}
