//! Append-only JSONL log of accepted edits.
//!
//! One [`NormalizedEdit`] per line, in acceptance order. Lines are never
//! rewritten; a later edit supersedes an earlier one at apply time. Appends
//! hold an exclusive lock on the file for the duration of the write, and
//! reads snapshot the file length under a shared lock so a concurrently
//! growing log never leaks a half-written line into a running read.
//!
//! [`NormalizedEdit`]: dv_core::edit::NormalizedEdit

pub mod reader;
pub mod writer;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use reader::EditLogIter;

/// Errors from reading or appending the edit log.
#[derive(Debug, Error)]
pub enum EditLogError {
    #[error("Edit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be parsed. Fatal: the log is the source of truth.
    #[error("Corrupt edit log {}: line {line}: {message}", .path.display())]
    CorruptLog {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Handle to one edit log file. Cheap to construct; opens the file per call.
#[derive(Debug, Clone)]
pub struct EditLog {
    path: PathBuf,
}

impl EditLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log file exists yet.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
