//! Per-run context
//!
//! Every phase receives the same [`RunContext`]: the collaborators it talks to
//! plus the journal entry of the current run.

use crate::adapters::akeneo::SourceApi;
use crate::adapters::store::StagingStore;
use crate::adapters::unchained::TargetApi;
use crate::config::SyncConfig;
use crate::core::journal::JournalEntry;
use crate::domain::ids::RunId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Tunables a run reads from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Announce only products updated after `since`
    pub incremental: bool,

    /// Cursor batch size for the transform passes
    pub batch_size: usize,
}

impl RunSettings {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            incremental: config.extract.incremental,
            batch_size: config.transform.batch_size,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            incremental: false,
            batch_size: 100,
        }
    }
}

/// Everything a phase needs for one run
#[derive(Clone)]
pub struct RunContext {
    pub store: Arc<dyn StagingStore>,
    pub source: Arc<dyn SourceApi>,
    pub target: Arc<dyn TargetApi>,
    pub entry: JournalEntry,
    pub settings: RunSettings,
}

impl RunContext {
    pub fn new(
        store: Arc<dyn StagingStore>,
        source: Arc<dyn SourceApi>,
        target: Arc<dyn TargetApi>,
        entry: JournalEntry,
        settings: RunSettings,
    ) -> Self {
        Self {
            store,
            source,
            target,
            entry,
            settings,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.entry.run_id
    }

    /// Low-water mark of the run
    pub fn since(&self) -> DateTime<Utc> {
        self.entry.since
    }
}
