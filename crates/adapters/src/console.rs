// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build console: the user-facing output stream of a job run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives console lines of a job run.
///
/// Lines arrive already masked; sinks never see registered secrets.
pub trait ConsoleSink: Clone + Send + Sync + 'static {
    fn line(&self, line: &str);
}

/// Console that prints to the agent's stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn line(&self, line: &str) {
        println!("{line}");
    }
}

/// Append-only console log at `<log_dir>/<job_id>.log`.
///
/// Each line opens, writes, and closes the file. Failures are logged via
/// tracing and never propagate into the build.
#[derive(Clone, Debug)]
pub struct FileConsole {
    path: PathBuf,
}

impl FileConsole {
    pub fn new(log_dir: &Path, job_id: &str) -> Self {
        Self { path: log_dir.join(format!("{job_id}.log")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl ConsoleSink for FileConsole {
    fn line(&self, line: &str) {
        if let Err(e) = self.write_line(line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write console log");
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::ConsoleSink;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct FakeConsoleState {
        lines: Vec<String>,
        cancel_on: Option<(String, CancellationToken)>,
    }

    /// Fake console that records every line
    #[derive(Clone, Default)]
    pub struct FakeConsole {
        inner: Arc<Mutex<FakeConsoleState>>,
    }

    impl FakeConsole {
        pub fn new() -> Self {
            Self::default()
        }

        /// Cancel `token` when a line containing `needle` is written.
        pub fn cancel_on_line(&self, needle: &str, token: CancellationToken) {
            self.inner.lock().cancel_on = Some((needle.to_string(), token));
        }

        pub fn lines(&self) -> Vec<String> {
            self.inner.lock().lines.clone()
        }

        pub fn output(&self) -> String {
            self.inner.lock().lines.join("\n")
        }

        pub fn last_line(&self) -> Option<String> {
            self.inner.lock().lines.last().cloned()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.inner.lock().lines.iter().any(|l| l.contains(needle))
        }

        pub fn clear(&self) {
            self.inner.lock().lines.clear();
        }
    }

    impl ConsoleSink for FakeConsole {
        fn line(&self, line: &str) {
            let mut inner = self.inner.lock();
            inner.lines.push(line.to_string());
            if let Some((needle, token)) = &inner.cancel_on {
                if line.contains(needle.as_str()) {
                    token.cancel();
                }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeConsole;

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
