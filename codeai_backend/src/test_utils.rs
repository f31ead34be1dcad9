//! Test helper utilities for the codeai backend.
//!
//! Polling assertions for output written by background workers, and small
//! fixtures for environment files and captured log output. These APIs are
//! intended for test-only code paths.

use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default timeout when waiting for the asynchronous log writer.
pub const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Default polling interval for [`assert_eventually`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Assert that a condition becomes true within a timeout.
///
/// Polls the condition and provides clear failure messages.
pub async fn assert_eventually<F, Fut>(
    timeout: Duration,
    poll_interval: Duration,
    description: &str,
    mut condition: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if condition().await {
            return;
        }

        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            panic!(
                "Assertion failed: '{}' did not become true within {:?}",
                description, timeout
            );
        }

        tokio::time::sleep(poll_interval.min(remaining)).await;
    }
}

/// Wait until the file at `path` exists and is non-empty.
pub async fn assert_file_eventually_non_empty(path: &Path) {
    let description = format!("{} has content", path.display());
    assert_eventually(LOG_FLUSH_TIMEOUT, POLL_INTERVAL, &description, || async move {
        std::fs::metadata(path)
            .map(|metadata| metadata.len() > 0)
            .unwrap_or(false)
    })
    .await;
}

/// Write an environment file named `name` into `dir` and return its path.
pub fn write_env_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents)
        .unwrap_or_else(|e| panic!("Failed to write env file {}: {e}", path.display()));
    path
}

/// In-memory log writer; clones share the same buffer.
///
/// Pass a clone to [`crate::Config::configure_logging`] and read it back with
/// [`CapturedLogs::contents`].
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner)).into_owned()
    }

    pub fn writer(&self) -> Box<dyn Write + Send> {
        Box::new(self.clone())
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Check if output contains all of the expected patterns
pub fn contains_all(output: &str, patterns: &[&str]) -> bool {
    patterns.iter().all(|pattern| output.contains(pattern))
}
