//! Journal entries and run status
//!
//! A run is recorded as an append-only pair of documents in the journal
//! collection: a RUNNING record written at start, then exactly one terminal
//! record carrying the outcome.

use crate::domain::ids::{EventId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion status of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    /// Run in progress
    Running,
    /// Extraction failed; staging may be partially replaced
    FailedExtract,
    /// Transform failed; event logs may be partial
    FailedTransform,
    /// Submission or ledger write failed
    FailedLoad,
    /// All phases succeeded
    Complete,
}

impl CompletionStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::FailedExtract => "FAILED_EXTRACT",
            Self::FailedTransform => "FAILED_TRANSFORM",
            Self::FailedLoad => "FAILED_LOAD",
            Self::Complete => "COMPLETE",
        }
    }

    /// Whether no further status may follow this one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The journal's view of the current run
///
/// Handed to every phase; `since` never changes once the run has started.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub run_id: RunId,

    /// Watermark: `started_at` of the last COMPLETE run, or the epoch
    pub since: DateTime<Utc>,

    pub started_at: DateTime<Utc>,

    pub status: CompletionStatus,
}

/// A persisted journal document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub run_id: RunId,
    pub since: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub status: CompletionStatus,

    /// Set on terminal records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Events submitted by a COMPLETE run, in submission order
    #[serde(default)]
    pub event_ids: Vec<EventId>,
}

impl JournalRecord {
    /// The RUNNING record written when a run starts
    pub fn running(entry: &JournalEntry) -> Self {
        Self {
            run_id: entry.run_id.clone(),
            since: entry.since,
            started_at: entry.started_at,
            status: CompletionStatus::Running,
            finished_at: None,
            event_ids: Vec::new(),
        }
    }

    /// The terminal record closing a run
    pub fn terminal(
        entry: &JournalEntry,
        status: CompletionStatus,
        finished_at: DateTime<Utc>,
        event_ids: Vec<EventId>,
    ) -> Self {
        Self {
            run_id: entry.run_id.clone(),
            since: entry.since,
            started_at: entry.started_at,
            status,
            finished_at: Some(finished_at),
            event_ids,
        }
    }

    /// Wall-clock duration of a finished run
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> JournalEntry {
        JournalEntry {
            run_id: RunId::new("run-1").unwrap(),
            since: DateTime::<Utc>::UNIX_EPOCH,
            started_at: Utc::now(),
            status: CompletionStatus::Running,
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(CompletionStatus::FailedTransform).unwrap(),
            json!("FAILED_TRANSFORM")
        );
        assert_eq!(CompletionStatus::Complete.to_string(), "COMPLETE");
    }

    #[test]
    fn test_only_running_is_not_terminal() {
        assert!(!CompletionStatus::Running.is_terminal());
        assert!(CompletionStatus::FailedExtract.is_terminal());
        assert!(CompletionStatus::FailedLoad.is_terminal());
        assert!(CompletionStatus::Complete.is_terminal());
    }

    #[test]
    fn test_record_round_trip_through_document() {
        let entry = entry();
        let record = JournalRecord::terminal(
            &entry,
            CompletionStatus::Complete,
            entry.started_at + chrono::Duration::seconds(5),
            vec!["PRODUCT:p1".parse().unwrap()],
        );
        let doc = serde_json::to_value(&record).unwrap();
        assert_eq!(doc["run_id"], "run-1");
        assert_eq!(doc["event_ids"], json!(["PRODUCT:p1"]));

        let parsed: JournalRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.duration(), Some(chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_running_record_has_no_finish() {
        let record = JournalRecord::running(&entry());
        assert_eq!(record.status, CompletionStatus::Running);
        assert!(record.finished_at.is_none());
        assert!(record.duration().is_none());
    }
}
