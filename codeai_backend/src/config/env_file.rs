//! Parser for `KEY=VALUE` environment files passed with `-c`.
//!
//! One entry per line. Blank lines and `#` comments are skipped and a leading
//! `export ` is ignored. The line is split on the first `=`, key and value are
//! trimmed, and values are taken verbatim (no quoting or escapes). A line that
//! does not fit this shape rejects the whole file. Duplicate keys: last wins.

use crate::error::EnvFileError;
use std::{collections::BTreeMap, path::Path};

/// Reads and parses the environment file at `path`.
///
/// # Errors
///
/// [`EnvFileError::Io`] if the file cannot be read, [`EnvFileError::Malformed`]
/// for the first line that is not a valid entry.
pub fn load(path: &Path) -> Result<BTreeMap<String, String>, EnvFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| EnvFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

/// Parses environment file `contents`; `path` is only used in errors.
pub fn parse(path: &Path, contents: &str) -> Result<BTreeMap<String, String>, EnvFileError> {
    let mut entries = BTreeMap::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let malformed = || EnvFileError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
            content: raw.to_string(),
        };

        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        let value = value.trim();
        // NUL cannot be stored in the process environment.
        if key.is_empty() || key.contains(char::is_whitespace) || key.contains('\0') {
            return Err(malformed());
        }
        if value.contains('\0') {
            return Err(malformed());
        }

        entries.insert(key.to_string(), value.to_string());
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(contents: &str) -> BTreeMap<String, String> {
        parse(Path::new("test.env"), contents).expect("valid env file")
    }

    #[test]
    fn single_entry_without_trailing_newline() {
        let entries = parse_ok("AA=Bb");
        assert_eq!(entries.get("AA").map(String::as_str), Some("Bb"));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn splits_on_first_equals_only() {
        let entries = parse_ok("URL=https://host/?a=b&c=d\n");
        assert_eq!(entries["URL"], "https://host/?a=b&c=d");
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let entries = parse_ok("\n# comment\n   \nA=1\n  # indented comment\nB=2\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["A"], "1");
        assert_eq!(entries["B"], "2");
    }

    #[test]
    fn trims_whitespace_and_crlf() {
        let entries = parse_ok("  KEY = value with spaces  \r\nOTHER=x\r\n");
        assert_eq!(entries["KEY"], "value with spaces");
        assert_eq!(entries["OTHER"], "x");
    }

    #[test]
    fn strips_export_prefix() {
        let entries = parse_ok("export TOKEN=abc");
        assert_eq!(entries["TOKEN"], "abc");
    }

    #[test]
    fn empty_value_is_allowed() {
        let entries = parse_ok("EMPTY=");
        assert_eq!(entries["EMPTY"], "");
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let entries = parse_ok("A=first\nA=second\n");
        assert_eq!(entries["A"], "second");
    }

    #[test]
    fn line_without_equals_is_rejected_with_line_number() {
        let err = parse(Path::new("x.env"), "A=1\nnot an entry\n").unwrap_err();
        match err {
            EnvFileError::Malformed { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "not an entry");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            parse(Path::new("x.env"), "=value"),
            Err(EnvFileError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn key_with_inner_whitespace_is_rejected() {
        assert!(matches!(
            parse(Path::new("x.env"), "MY KEY=value"),
            Err(EnvFileError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn nul_in_key_or_value_is_rejected() {
        assert!(matches!(
            parse(Path::new("x.env"), "OK=1\nNUL_VALUE=a\0b"),
            Err(EnvFileError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            parse(Path::new("x.env"), "NUL\0KEY=value"),
            Err(EnvFileError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.env")).unwrap_err();
        assert!(matches!(err, EnvFileError::Io { .. }));
        assert!(err.to_string().contains("missing.env"));
    }
}
