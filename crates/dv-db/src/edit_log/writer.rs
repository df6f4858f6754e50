//! Edit log appends.

use std::fs::{self, OpenOptions};
use std::io::Write;

use chrono::{DateTime, TimeDelta, Utc};
use dv_core::edit::NormalizedEdit;
use fs2::FileExt;
use serde_jsonlines::JsonLinesWriter;

use super::{EditLog, EditLogError};

impl EditLog {
    /// Append one accepted edit as a single line.
    ///
    /// Creates the file (and its parent directory) on first use. The line is
    /// serialized before the file is touched and handed to the OS in one
    /// `write_all`, so a serialization failure writes nothing. An I/O error
    /// part way through the write can still leave a truncated last line,
    /// which the reader reports as corrupt. No retries.
    ///
    /// # Errors
    ///
    /// Returns `EditLogError::Io` if the file cannot be opened, locked, or
    /// written.
    pub fn append(&self, edit: &NormalizedEdit) -> Result<(), EditLogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let line = encode_line(edit)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;

        let written = (&file).write_all(&line).and_then(|()| (&file).flush());
        let unlocked = FileExt::unlock(&file);

        written?;
        unlocked?;

        tracing::debug!(
            table = %edit.table(),
            id = edit.id(),
            action = %edit.action(),
            path = %self.path.display(),
            "edit appended"
        );
        Ok(())
    }

    /// Acceptance time for the next append: `now`, or one microsecond past the
    /// latest logged `submitted_at` when the clock reads earlier than that.
    ///
    /// Keeps acceptance order and `submitted_at` order the same even if the
    /// system clock steps backwards between submissions. Call with the write
    /// lock held so no other append can land in between.
    ///
    /// # Errors
    ///
    /// `EditLogError::Io` or `EditLogError::CorruptLog` from reading the log.
    pub fn next_stamp(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, EditLogError> {
        let mut latest = None;
        for edit in self.read_all()? {
            let stamp = edit?.submitted_at;
            latest = latest.max(Some(stamp));
        }
        Ok(stamp_after(now, latest))
    }
}

fn stamp_after(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match latest {
        Some(latest) if now <= latest => latest + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// One edit as a complete JSONL line, trailing newline included.
fn encode_line(edit: &NormalizedEdit) -> std::io::Result<Vec<u8>> {
    let mut line = Vec::new();
    JsonLinesWriter::new(&mut line).write(edit)?;
    Ok(line)
}
