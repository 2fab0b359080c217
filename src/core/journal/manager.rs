//! Journal persistence
//!
//! Owns the sync watermark and the run state machine. Records are only ever
//! appended, so a crashed run leaves a RUNNING record without a terminal one
//! and never moves the watermark.

use crate::adapters::store::{collect_all, Filter, StagingStore, JOURNAL_COLLECTION};
use crate::core::journal::entry::{CompletionStatus, JournalEntry, JournalRecord};
use crate::domain::errors::JournalError;
use crate::domain::ids::{EventId, RunId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const JOURNAL_BATCH_SIZE: usize = 500;

/// Journal of sync runs
pub struct Journal {
    store: Arc<dyn StagingStore>,
}

impl Journal {
    /// Create a journal over the given store
    pub fn new(store: Arc<dyn StagingStore>) -> Self {
        Self { store }
    }

    /// Start a run
    ///
    /// `since` is the `started_at` of the most recent COMPLETE run, or the
    /// Unix epoch when `reset` is set or no run ever completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be read or the RUNNING record
    /// cannot be written.
    pub async fn start(&self, reset: bool) -> Result<JournalEntry, JournalError> {
        let since = if reset {
            tracing::info!("Journal reset requested, starting from the epoch");
            DateTime::<Utc>::UNIX_EPOCH
        } else {
            self.last_complete()
                .await?
                .map_or(DateTime::<Utc>::UNIX_EPOCH, |record| record.started_at)
        };

        let entry = JournalEntry {
            run_id: RunId::generate(),
            since,
            started_at: Utc::now(),
            status: CompletionStatus::Running,
        };

        self.append(&JournalRecord::running(&entry)).await?;

        tracing::info!(
            run_id = %entry.run_id,
            since = %entry.since.to_rfc3339(),
            "Sync run started"
        );
        Ok(entry)
    }

    /// Record the outcome of a run
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::NotTerminal`] for RUNNING and
    /// [`JournalError::AlreadyFinished`] if the run already has an outcome.
    pub async fn report_final_status(
        &self,
        status: CompletionStatus,
        entry: &JournalEntry,
        event_ids: Vec<EventId>,
    ) -> Result<JournalRecord, JournalError> {
        if !status.is_terminal() {
            return Err(JournalError::NotTerminal(status.to_string()));
        }

        let existing = self.run_records(&entry.run_id).await?;
        if let Some(finished) = existing.iter().find(|r| r.status.is_terminal()) {
            return Err(JournalError::AlreadyFinished {
                run_id: entry.run_id.to_string(),
                status: finished.status.to_string(),
            });
        }

        let record = JournalRecord::terminal(entry, status, Utc::now(), event_ids);
        self.append(&record).await?;

        tracing::info!(
            run_id = %entry.run_id,
            status = %status,
            events = record.event_ids.len(),
            "Sync run finished"
        );
        Ok(record)
    }

    /// The most recent COMPLETE run
    pub async fn last_complete(&self) -> Result<Option<JournalRecord>, JournalError> {
        let filter = Filter::eq("status", CompletionStatus::Complete.as_str());
        let records = self.load(filter).await?;
        Ok(records.into_iter().max_by_key(|r| r.started_at))
    }

    /// Latest state of the most recent runs, newest first
    ///
    /// A run that never reported an outcome shows as RUNNING.
    pub async fn history(&self, limit: usize) -> Result<Vec<JournalRecord>, JournalError> {
        let mut latest: HashMap<RunId, JournalRecord> = HashMap::new();
        for record in self.load(Filter::All).await? {
            match latest.get(&record.run_id) {
                Some(seen) if seen.status.is_terminal() => {}
                _ => {
                    latest.insert(record.run_id.clone(), record);
                }
            }
        }

        let mut runs: Vec<JournalRecord> = latest.into_values().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit);
        Ok(runs)
    }

    async fn run_records(&self, run_id: &RunId) -> Result<Vec<JournalRecord>, JournalError> {
        self.load(Filter::eq("run_id", run_id.as_str())).await
    }

    async fn load(&self, filter: Filter) -> Result<Vec<JournalRecord>, JournalError> {
        let cursor = self
            .store
            .find(JOURNAL_COLLECTION, filter, JOURNAL_BATCH_SIZE)
            .await?;
        collect_all(cursor)
            .await?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| JournalError::Corrupt(e.to_string()))
            })
            .collect()
    }

    async fn append(&self, record: &JournalRecord) -> Result<(), JournalError> {
        let doc = serde_json::to_value(record).map_err(|e| JournalError::Corrupt(e.to_string()))?;
        self.store
            .bulk_insert_unordered(JOURNAL_COLLECTION, vec![doc])
            .await?;
        Ok(())
    }
}
