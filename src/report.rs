/// Machine-readable record of a rename run.
///
/// A [`RunReport`] collects every [`RenameEvent`] of a walk through a
/// [`Recorder`] and can be written to disk as pretty-printed JSON.
use crate::walker::{RenameEvent, RenameObserver, RenameSummary};
use serde_json::json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while writing a report.
#[derive(Debug)]
pub enum ReportError {
    /// The report could not be serialized.
    SerializationFailed { reason: String },
    /// The report file could not be written.
    WriteFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializationFailed { reason } => {
                write!(f, "Failed to serialize report: {}", reason)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "Failed to write report {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// Everything that happened during one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// RFC 3339 timestamp of when the run started.
    pub timestamp: String,
    /// The directory that was walked.
    pub root: PathBuf,
    /// Whether the run only planned renames.
    pub dry_run: bool,
    /// Every decision, in the order it was made.
    pub events: Vec<RenameEvent>,
}

impl RunReport {
    /// Creates an empty report stamped with the current time.
    pub fn new(root: PathBuf, dry_run: bool) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            root,
            dry_run,
            events: Vec::new(),
        }
    }

    /// Renders the report, including the walk's summary, as JSON.
    pub fn to_json(&self, summary: &RenameSummary) -> Result<String, ReportError> {
        let document = json!({
            "timestamp": self.timestamp,
            "root": self.root.to_string_lossy().to_string(),
            "dry_run": self.dry_run,
            "summary": summary,
            "events": self.events,
        });

        serde_json::to_string_pretty(&document).map_err(|e| ReportError::SerializationFailed {
            reason: e.to_string(),
        })
    }

    /// Writes the report to `path`.
    pub fn save(&self, path: &Path, summary: &RenameSummary) -> Result<(), ReportError> {
        let json = self.to_json(summary)?;
        fs::write(path, json).map_err(|e| ReportError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Observer that records events into a [`RunReport`] and forwards everything
/// to another observer.
pub struct Recorder<'a> {
    report: &'a mut RunReport,
    inner: &'a mut dyn RenameObserver,
}

impl<'a> Recorder<'a> {
    pub fn new(report: &'a mut RunReport, inner: &'a mut dyn RenameObserver) -> Self {
        Self { report, inner }
    }
}

impl RenameObserver for Recorder<'_> {
    fn directory_started(&mut self, path: &Path) {
        self.inner.directory_started(path);
    }

    fn event(&mut self, event: &RenameEvent) {
        self.report.events.push(event.clone());
        self.inner.event(event);
    }

    fn directory_unreadable(&mut self, path: &Path, error: &io::Error) {
        self.inner.directory_unreadable(path, error);
    }

    fn entry_unreadable(&mut self, path: &Path, error: &io::Error) {
        self.inner.entry_unreadable(path, error);
    }
}
