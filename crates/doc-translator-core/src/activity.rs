//! Append-only CSV activity log.
//!
//! Every successful translation appends one row. The file is created with a
//! header on first use and rows are never rewritten afterwards, so the log
//! doubles as a simple audit trail. No locking is done; the tool assumes a
//! single user per log file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: String,
    /// Free-form label for who or what performed the activity. The web
    /// surface stores the submitted username here.
    pub activity_type: String,
    /// Original file name, or "-" for typed-text translations.
    pub file_name: String,
    pub source_language: String,
    pub target_language: String,
}

/// Handle to a CSV activity log file.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped row, creating the file (with a header row)
    /// if it does not exist yet.
    pub fn append(
        &self,
        activity_type: &str,
        file_name: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let needs_header = self
            .path
            .metadata()
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        let record = ActivityRecord {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            activity_type: activity_type.to_string(),
            file_name: file_name.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };

        writer
            .serialize(&record)
            .map_err(|e| Error::ActivityLog(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| Error::ActivityLog(e.to_string()))?;

        debug!(file = %self.path.display(), "appended activity row");
        Ok(())
    }

    /// All rows in file order (oldest first). A missing log file is an
    /// empty log, not an error.
    pub fn read_all(&self) -> Result<Vec<ActivityRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| Error::ActivityLog(e.to_string()))?;

        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record.map_err(|e| Error::ActivityLog(e.to_string()))?);
        }
        Ok(records)
    }

    /// The last `n` rows, most recent first.
    pub fn read_recent(&self, n: usize) -> Result<Vec<ActivityRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(n);
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_file_with_header_and_appends() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("user_log.csv"));

        log.append("alice", "report.docx", "English", "Spanish")
            .unwrap();
        log.append("bob", "-", "auto", "French").unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,activity_type,file_name,source_language,target_language"
        );
        assert!(lines[1].contains("report.docx"));
        assert!(lines[2].contains("French"));
    }

    #[test]
    fn header_is_written_only_once() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("log.csv"));

        log.append("a", "x.pdf", "auto", "German").unwrap();
        log.append("b", "y.pdf", "auto", "German").unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let headers = contents.lines().filter(|l| l.starts_with("timestamp")).count();
        assert_eq!(headers, 1);
    }

    #[test]
    fn read_all_round_trips_records() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("log.csv"));

        log.append("alice", "slides.pptx", "English", "Japanese")
            .unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activity_type, "alice");
        assert_eq!(records[0].file_name, "slides.pptx");
        assert_eq!(records[0].target_language, "Japanese");
    }

    #[test]
    fn read_recent_returns_newest_first() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("log.csv"));

        for name in ["first.docx", "second.docx", "third.docx"] {
            log.append("alice", name, "auto", "Spanish").unwrap();
        }

        let recent = log.read_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].file_name, "third.docx");
        assert_eq!(recent[1].file_name, "second.docx");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("nope.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn fields_with_commas_survive_quoting() {
        let dir = tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("log.csv"));

        log.append("alice", "notes, final.docx", "auto", "Spanish")
            .unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records[0].file_name, "notes, final.docx");
    }
}
