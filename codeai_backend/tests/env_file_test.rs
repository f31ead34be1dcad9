//! Tests for loading `-c` environment files
//!
//! Loading only fills `Config::env`; the process environment changes when
//! `Config::apply_env` runs. Tests that touch the process environment are
//! serialized.

use codeai_backend::config::Config;
use codeai_backend::error::{BootstrapError, EnvFileError};
use codeai_backend::shell::parse_flags;
use codeai_backend::test_utils::write_env_file;
use serial_test::serial;
use std::process::Command;
use tempfile::tempdir;

#[test]
#[serial]
fn test_config_flag_loads_variables_and_apply_exports_them() {
    let dir = tempdir().unwrap();
    let file = write_env_file(dir.path(), "configFlagTest", "AA=Bb");
    // SAFETY: serialized test; no other thread touches the environment.
    unsafe { std::env::remove_var("AA") };

    let mut config = Config::new();
    let outcome = parse_flags(&["codeai-backend", "-c", file.to_str().unwrap()], &mut config);
    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(config.env().get("AA").map(String::as_str), Some("Bb"));
    assert!(
        std::env::var("AA").is_err(),
        "parsing must not touch the process environment"
    );

    config.apply_env();
    assert_eq!(std::env::var("AA").as_deref(), Ok("Bb"));

    // SAFETY: as above.
    unsafe { std::env::remove_var("AA") };
}

#[test]
#[serial]
fn test_apply_env_overrides_existing_values() {
    let dir = tempdir().unwrap();
    let file = write_env_file(
        dir.path(),
        "override.env",
        "CODEAI_TEST_OVERRIDE=from-file\n",
    );
    // SAFETY: serialized test; no other thread touches the environment.
    unsafe { std::env::set_var("CODEAI_TEST_OVERRIDE", "original") };

    let mut config = Config::new();
    config.load_env_file(&file).unwrap();
    config.apply_env();
    assert_eq!(
        std::env::var("CODEAI_TEST_OVERRIDE").as_deref(),
        Ok("from-file")
    );

    // SAFETY: as above.
    unsafe { std::env::remove_var("CODEAI_TEST_OVERRIDE") };
}

#[test]
fn test_repeated_loads_merge_with_last_wins() {
    let dir = tempdir().unwrap();
    let first = write_env_file(dir.path(), "first.env", "A=1\nB=2\n");
    let second = write_env_file(dir.path(), "second.env", "B=3\nC=4\n");

    let mut config = Config::new();
    config.load_env_file(&first).unwrap();
    config.load_env_file(&second).unwrap();

    let pairs: Vec<(&str, &str)> = config
        .env()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(pairs, vec![("A", "1"), ("B", "3"), ("C", "4")]);
}

#[test]
fn test_malformed_file_fails_parse_and_loads_nothing() {
    let dir = tempdir().unwrap();
    let file = write_env_file(dir.path(), "bad.env", "GOOD=1\nthis line is wrong\n");

    let mut config = Config::new();
    let outcome = parse_flags(&["codeai-backend", "-c", file.to_str().unwrap()], &mut config);

    match outcome.error() {
        Some(BootstrapError::EnvFile(EnvFileError::Malformed { line, .. })) => {
            assert_eq!(*line, 2)
        }
        other => panic!("expected malformed env file error, got {other:?}"),
    }
    assert!(outcome.output().contains("Usage of codeai-backend"));
    assert!(config.env().is_empty());
}

#[test]
fn test_nul_byte_in_env_file_fails_parse_instead_of_export() {
    let dir = tempdir().unwrap();
    let file = write_env_file(dir.path(), "nul.env", "CODEAI_NUL_VALUE=a\0b\n");

    let mut config = Config::new();
    let outcome = parse_flags(&["codeai-backend", "-c", file.to_str().unwrap()], &mut config);

    assert!(matches!(
        outcome.error(),
        Some(BootstrapError::EnvFile(EnvFileError::Malformed { line: 1, .. }))
    ));
    assert_eq!(outcome.exit_code(), Some(2));
    assert!(config.env().is_empty());
}

#[test]
fn test_settings_before_failing_env_file_are_applied() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.env");

    let mut config = Config::new();
    let outcome = parse_flags(
        &[
            "codeai-backend",
            "-reportErrors",
            "-c",
            missing.to_str().unwrap(),
        ],
        &mut config,
    );
    assert!(outcome.error().is_some());
    assert!(config.is_error_reporting_enabled());
}

#[cfg(unix)]
#[test]
fn test_apply_env_to_child_process() {
    let dir = tempdir().unwrap();
    let file = write_env_file(dir.path(), "child.env", "CODEAI_CHILD_ONLY=visible\n");

    let mut config = Config::new();
    config.load_env_file(&file).unwrap();

    let output = config
        .apply_env_to(Command::new("sh").args(["-c", "printf %s \"$CODEAI_CHILD_ONLY\""]))
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "visible");
    assert!(std::env::var("CODEAI_CHILD_ONLY").is_err());
}
