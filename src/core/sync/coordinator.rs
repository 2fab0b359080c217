//! Sync coordinator - drives one run through every phase
//!
//! Journal.start → extract → transform → load → journal outcome. Each phase
//! is a hard barrier. A phase failure is recorded as the matching FAILED_*
//! status and then returned to the caller.

use super::context::{RunContext, RunSettings};
use super::summary::SyncSummary;
use crate::adapters::akeneo::{AkeneoClient, SourceApi};
use crate::adapters::store::{create_staging_store, StagingStore};
use crate::adapters::unchained::{TargetApi, UnchainedClient};
use crate::config::SyncConfig;
use crate::core::extract::extract;
use crate::core::journal::{CompletionStatus, Journal, JournalEntry};
use crate::core::load::load;
use crate::core::transform::transform;
use crate::domain::{Result, SyncError};
use crate::{log_error_with_context, log_phase_complete, log_phase_start};
use std::sync::Arc;
use std::time::Instant;

/// Sync coordinator
pub struct SyncCoordinator {
    store: Arc<dyn StagingStore>,
    source: Arc<dyn SourceApi>,
    target: Arc<dyn TargetApi>,
    journal: Journal,
    settings: RunSettings,
}

impl SyncCoordinator {
    /// Create a coordinator over existing collaborators
    pub fn new(
        store: Arc<dyn StagingStore>,
        source: Arc<dyn SourceApi>,
        target: Arc<dyn TargetApi>,
        settings: RunSettings,
    ) -> Self {
        let journal = Journal::new(Arc::clone(&store));
        Self {
            store,
            source,
            target,
            journal,
            settings,
        }
    }

    /// Connect every collaborator described by the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the staging store cannot be initialized or either
    /// API refuses the credentials.
    pub async fn from_config(config: &SyncConfig) -> Result<Self> {
        let store = create_staging_store(&config.staging).await?;
        let source: Arc<dyn SourceApi> = Arc::new(AkeneoClient::connect(config.akeneo.clone()).await?);
        let target: Arc<dyn TargetApi> =
            Arc::new(UnchainedClient::connect(config.unchained.clone()).await?);

        tracing::info!(
            backend = store.backend_name(),
            source = source.endpoint(),
            target = target.endpoint(),
            "Sync collaborators ready"
        );

        Ok(Self::new(store, source, target, RunSettings::from_config(config)))
    }

    /// The run journal
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Returns the failing phase's error after recording FAILED_EXTRACT,
    /// FAILED_TRANSFORM or FAILED_LOAD. A journal error before the run
    /// started is returned as is.
    pub async fn run(&self, reset: bool) -> Result<SyncSummary> {
        let start = Instant::now();
        let entry = self.journal.start(reset).await?;
        let context = RunContext::new(
            Arc::clone(&self.store),
            Arc::clone(&self.source),
            Arc::clone(&self.target),
            entry.clone(),
            self.settings,
        );

        log_phase_start!("extract", entry.run_id);
        let extract_summary = match extract(&context).await {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail(CompletionStatus::FailedExtract, &entry, e.into()).await),
        };
        log_phase_complete!(
            "extract",
            extract_summary.total_documents(),
            extract_summary.duration
        );

        log_phase_start!("transform", entry.run_id);
        let transform_summary = match transform(&context).await {
            Ok(summary) => summary,
            Err(e) => {
                return Err(self
                    .fail(CompletionStatus::FailedTransform, &entry, e.into())
                    .await)
            }
        };
        log_phase_complete!(
            "transform",
            transform_summary.total_events(),
            transform_summary.duration
        );

        log_phase_start!("load", entry.run_id);
        let load_start = Instant::now();
        let event_ids = match load(&context).await {
            Ok(ids) => ids,
            Err(e) => return Err(self.fail(CompletionStatus::FailedLoad, &entry, e.into()).await),
        };
        log_phase_complete!("load", event_ids.len(), load_start.elapsed());

        self.journal
            .report_final_status(CompletionStatus::Complete, &entry, event_ids.clone())
            .await?;

        let summary = SyncSummary {
            run_id: entry.run_id,
            since: entry.since,
            status: CompletionStatus::Complete,
            extract: extract_summary,
            transform: transform_summary,
            event_ids,
            duration: start.elapsed(),
        };
        summary.log_summary();
        Ok(summary)
    }

    /// Record a phase failure and hand the error back
    async fn fail(
        &self,
        status: CompletionStatus,
        entry: &JournalEntry,
        error: SyncError,
    ) -> SyncError {
        log_error_with_context!(error, status.as_str());
        if let Err(journal_error) = self
            .journal
            .report_final_status(status, entry, Vec::new())
            .await
        {
            tracing::error!(
                run_id = %entry.run_id,
                status = %status,
                error = %journal_error,
                "Failed to record run outcome"
            );
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::akeneo::Resource;
    use crate::adapters::store::MemoryStore;
    use crate::core::test_support::{FakeSource, FakeTarget};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn coordinator(
        store: &MemoryStore,
        source: FakeSource,
        target: FakeTarget,
    ) -> SyncCoordinator {
        SyncCoordinator::new(
            Arc::new(store.clone()),
            Arc::new(source),
            Arc::new(target),
            RunSettings::default(),
        )
    }

    fn catalog() -> FakeSource {
        FakeSource::default()
            .with(
                Resource::Products,
                vec![json!({"identifier": "p1", "created": "2020-01-01T00:00:00+00:00", "values": {}})],
            )
            .with(Resource::Channels, vec![json!({"code": "web"})])
    }

    #[tokio::test]
    async fn test_complete_run() {
        let store = MemoryStore::new();
        let sync = coordinator(&store, catalog(), FakeTarget::default());

        let summary = sync.run(false).await.unwrap();
        assert_eq!(summary.status, CompletionStatus::Complete);
        assert_eq!(summary.since, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(summary.submitted(), 2);

        let last = sync.journal().last_complete().await.unwrap().unwrap();
        assert_eq!(last.run_id, summary.run_id);
        assert_eq!(last.event_ids, summary.event_ids);
    }

    #[tokio::test]
    async fn test_extract_failure_is_journaled() {
        let store = MemoryStore::new();
        let sync = coordinator(
            &store,
            catalog().failing_on(Resource::Locales),
            FakeTarget::default(),
        );

        let err = sync.run(false).await.unwrap_err();
        assert!(matches!(err, SyncError::Extract(_)));

        let history = sync.journal().history(1).await.unwrap();
        assert_eq!(history[0].status, CompletionStatus::FailedExtract);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_watermark() {
        let store = MemoryStore::new();
        let first = coordinator(&store, catalog(), FakeTarget::default());
        let complete = first.run(false).await.unwrap();

        let failing = coordinator(&store, catalog(), FakeTarget::failing());
        let err = failing.run(false).await.unwrap_err();
        assert!(matches!(err, SyncError::Load(_)));

        let history = failing.journal().history(1).await.unwrap();
        assert_eq!(history[0].status, CompletionStatus::FailedLoad);
        let last = failing.journal().last_complete().await.unwrap().unwrap();
        assert_eq!(last.run_id, complete.run_id);
    }
}
