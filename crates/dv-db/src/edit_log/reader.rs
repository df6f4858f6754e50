//! Edit log reads.
//!
//! Lines are read as raw bytes and handed straight to `serde_json`, so a line
//! that is not valid UTF-8 is reported as corrupt at its own line number like
//! any other unparseable line.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Take};
use std::path::PathBuf;

use dv_core::edit::NormalizedEdit;
use dv_schema::SchemaRegistry;
use dv_schema::registry::LOG_LINE;
use fs2::FileExt;

use super::{EditLog, EditLogError};

impl EditLog {
    /// Iterate every logged edit in append order.
    ///
    /// The iterator is bounded to the file length at the time of this call.
    /// Call again to restart from the beginning. A log that does not exist
    /// yet reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `EditLogError::Io` if the file exists but cannot be opened.
    /// Parse failures surface from the iterator as `CorruptLog`.
    pub fn read_all(&self) -> Result<EditLogIter, EditLogError> {
        Ok(EditLogIter {
            path: self.path.clone(),
            lines: self.raw_lines()?,
        })
    }

    /// Read the whole log, failing on the first corrupt line.
    ///
    /// # Errors
    ///
    /// `EditLogError::Io` or `EditLogError::CorruptLog`.
    pub fn load_all(&self) -> Result<Vec<NormalizedEdit>, EditLogError> {
        self.read_all()?.collect()
    }

    /// Check every line against the log-line JSON Schema without stopping at
    /// the first problem. Returns `(line, message)` pairs.
    ///
    /// # Errors
    ///
    /// `EditLogError::Io` if the file cannot be read.
    pub fn check(&self, schema: &SchemaRegistry) -> Result<Vec<(usize, String)>, EditLogError> {
        let mut problems = Vec::new();
        for next in self.raw_lines()? {
            let (number, bytes) = next?;
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(value) => {
                    if let Err(e) = schema.validate(LOG_LINE, &value) {
                        problems.push((number, e.to_string()));
                    } else if let Err(e) = serde_json::from_value::<NormalizedEdit>(value) {
                        problems.push((number, e.to_string()));
                    }
                }
                Err(e) => problems.push((number, e.to_string())),
            }
        }
        Ok(problems)
    }

    fn raw_lines(&self) -> Result<RawLines, EditLogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RawLines {
                    reader: None,
                    line: 0,
                });
            }
            Err(e) => return Err(e.into()),
        };

        FileExt::lock_shared(&file)?;
        let len = file.metadata().map(|m| m.len());
        FileExt::unlock(&file)?;
        let len = len?;

        Ok(RawLines {
            reader: Some(BufReader::new(file.take(len))),
            line: 0,
        })
    }
}

/// Non-blank lines of the log as raw bytes, numbered from 1.
struct RawLines {
    reader: Option<BufReader<Take<File>>>,
    line: usize,
}

impl RawLines {
    fn stop(&mut self) {
        self.reader = None;
    }
}

impl Iterator for RawLines {
    type Item = std::io::Result<(usize, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        loop {
            let mut bytes = Vec::new();
            match reader.read_until(b'\n', &mut bytes) {
                Ok(0) => {
                    self.stop();
                    return None;
                }
                Ok(_) => {
                    self.line += 1;
                    if !bytes.trim_ascii().is_empty() {
                        return Some(Ok((self.line, bytes)));
                    }
                }
                Err(e) => {
                    self.stop();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Lazy iterator over logged edits. Stops after the first error.
pub struct EditLogIter {
    path: PathBuf,
    lines: RawLines,
}

impl Iterator for EditLogIter {
    type Item = Result<NormalizedEdit, EditLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, bytes) = match self.lines.next()? {
            Ok(next) => next,
            Err(e) => return Some(Err(e.into())),
        };

        match serde_json::from_slice::<NormalizedEdit>(&bytes) {
            Ok(edit) => Some(Ok(edit)),
            Err(e) => {
                self.lines.stop();
                Some(Err(EditLogError::CorruptLog {
                    path: self.path.clone(),
                    line,
                    message: e.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::edit;
    use dv_core::edit::Edit;
    use dv_core::tables::EntityTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    fn blocked(id: i64, minute: u32) -> NormalizedEdit {
        edit(
            EntityTable::Event,
            id,
            Edit::MarkBlocked {
                reason: "ask an archivist".into(),
            },
            minute,
        )
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("absent.jsonl"));
        assert_eq!(log.load_all().unwrap(), Vec::new());
    }

    #[test]
    fn append_then_read_yields_exactly_that_edit() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        let e = blocked(3, 0);
        log.append(&e).unwrap();
        assert_eq!(log.load_all().unwrap(), vec![e]);
    }

    #[test]
    fn read_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();
        log.append(&blocked(2, 1)).unwrap();

        let first: Vec<_> = log.read_all().unwrap().map(Result::unwrap).collect();
        let second: Vec<_> = log.read_all().unwrap().map(Result::unwrap).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn read_is_bounded_to_length_at_start() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();

        let iter = log.read_all().unwrap();
        log.append(&blocked(2, 1)).unwrap();

        let ids: Vec<i64> = iter.map(|e| e.unwrap().id()).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(log.load_all().unwrap().len(), 2);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"\n   \n")
            .unwrap();
        log.append(&blocked(2, 1)).unwrap();

        assert_eq!(log.load_all().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_line_is_fatal_and_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"{\"table\": \"event\", \"id\": \n")
            .unwrap();
        log.append(&blocked(2, 1)).unwrap();

        let mut iter = log.read_all().unwrap();
        assert!(iter.next().unwrap().is_ok());
        match iter.next().unwrap() {
            Err(EditLogError::CorruptLog { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt log, got {other:?}"),
        }
        assert!(iter.next().is_none(), "iterator stops after an error");

        let err = log.load_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn check_reports_every_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(
            file,
            "{}",
            json!({"table": "article", "id": 1, "action": "mark_valid",
                   "submitted_at": "2026-10-16T09:00:00Z"})
        )
        .unwrap();

        let problems = log.check(&SchemaRegistry::new()).unwrap();
        let lines: Vec<usize> = problems.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn invalid_utf8_line_is_corrupt_at_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        log.append(&blocked(1, 0)).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"\xff\xfe\n")
            .unwrap();

        match log.load_all().unwrap_err() {
            EditLogError::CorruptLog { line, .. } => assert_eq!(line, 2),
            other => panic!("expected corrupt log, got {other:?}"),
        }

        let problems = log.check(&SchemaRegistry::new()).unwrap();
        let lines: Vec<usize> = problems.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![2]);
    }

    #[test]
    fn invalid_utf8_inside_a_string_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let log = EditLog::new(dir.path().join("edits.jsonl"));
        std::fs::write(log.path(), b"{\"table\": \"ev\xffent\"}\n").unwrap();

        match log.read_all().unwrap().next().unwrap() {
            Err(EditLogError::CorruptLog { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected corrupt log, got {other:?}"),
        }
    }
}
