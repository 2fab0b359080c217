//! Run summary and reporting

use crate::core::extract::ExtractSummary;
use crate::core::journal::CompletionStatus;
use crate::core::transform::TransformSummary;
use crate::domain::ids::{EventId, RunId};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Summary of a COMPLETE run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub run_id: RunId,

    /// Watermark the run diffed against
    pub since: DateTime<Utc>,

    pub status: CompletionStatus,

    pub extract: ExtractSummary,

    pub transform: TransformSummary,

    /// Submitted events, in submission order
    pub event_ids: Vec<EventId>,

    pub duration: Duration,
}

impl SyncSummary {
    /// Number of submitted events
    pub fn submitted(&self) -> usize {
        self.event_ids.len()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        self.extract.log_summary();
        self.transform.log_summary();
        tracing::info!(
            run_id = %self.run_id,
            status = %self.status,
            since = %self.since.to_rfc3339(),
            staged = self.extract.total_documents(),
            events = self.transform.total_events(),
            submitted = self.submitted(),
            duration_secs = self.duration.as_secs(),
            "Sync completed"
        );
    }
}
