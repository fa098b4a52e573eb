//! Per-run outcome of the batch tools
//!
//! A batch keeps going when a single file fails; the failure is logged and
//! recorded here so the caller can decide on the exit status.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

/// A file the batch could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

/// Files written, skipped and failed during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Files looked at
    pub processed: usize,
    /// Files produced or rewritten
    pub written: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&mut self, path: impl Into<PathBuf>) {
        self.written.push(path.into());
    }

    /// Record and log a failure for `path`
    pub fn record_failure(&mut self, path: &Path, error: impl fmt::Display) {
        warn!(path = %path.display(), error = %error, "Failed to process file");
        self.failures.push(Failure {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} written, {} failed",
            self.processed,
            self.written.len(),
            self.failures.len()
        )
    }
}
