//! Two-wave extraction into staging
//!
//! Each wave spawns its tasks on a [`JoinSet`] and waits for all of them.
//! The first failing task aborts the others and the extraction. Tasks write
//! to disjoint collections, so completion order does not matter.

use super::plan::{
    attribute_options_task, family_variants_task, wave_one, ExtractTask, SELECT_ATTRIBUTE_TYPES,
};
use crate::adapters::akeneo::SourceApi;
use crate::adapters::store::{collect_all, staging_collection, Filter, StagingStore};
use crate::core::sync::RunContext;
use crate::domain::errors::ExtractError;
use crate::domain::record::{set_field, Document};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

const PARENT_BATCH_SIZE: usize = 500;

/// Document count written to one staging collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCollection {
    pub collection: String,
    pub documents: usize,
}

/// Outcome of an extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Staged collections, sorted by name
    pub staged: Vec<StagedCollection>,
    pub duration: Duration,
}

impl ExtractSummary {
    /// Total number of staged documents
    pub fn total_documents(&self) -> usize {
        self.staged.iter().map(|s| s.documents).sum()
    }

    /// Documents staged into `collection`, if it was part of the run
    pub fn count(&self, collection: &str) -> Option<usize> {
        self.staged
            .iter()
            .find(|s| s.collection == collection)
            .map(|s| s.documents)
    }

    pub fn log_summary(&self) {
        for staged in &self.staged {
            tracing::debug!(
                collection = %staged.collection,
                documents = staged.documents,
                "Staged collection"
            );
        }
        tracing::info!(
            collections = self.staged.len(),
            documents = self.total_documents(),
            duration_ms = self.duration.as_millis() as u64,
            "Extraction summary"
        );
    }
}

/// Fetch every source resource and replace its staging collection
///
/// # Errors
///
/// Returns the first fetch, staging or task failure. Collections replaced
/// before the failure keep their new contents; the journal marks the run
/// FAILED_EXTRACT so nothing downstream consumes them.
pub async fn extract(context: &RunContext) -> Result<ExtractSummary, ExtractError> {
    let start = Instant::now();

    tracing::info!(
        run_id = %context.run_id(),
        source = context.source.endpoint(),
        "Starting extraction"
    );

    let mut staged = run_wave("wave-1", wave_one(), context).await?;

    let families = load_parents(context.store.as_ref(), "families", Filter::All).await?;
    let select_types = SELECT_ATTRIBUTE_TYPES
        .iter()
        .map(|t| Value::from(*t))
        .collect();
    let attributes = load_parents(
        context.store.as_ref(),
        "attributes",
        Filter::In("type".to_string(), select_types),
    )
    .await?;

    let wave_two = vec![
        family_variants_task(&families),
        attribute_options_task(&attributes),
    ];
    staged.extend(run_wave("wave-2", wave_two, context).await?);
    staged.sort_by(|a, b| a.collection.cmp(&b.collection));

    Ok(ExtractSummary {
        staged,
        duration: start.elapsed(),
    })
}

async fn run_wave(
    wave: &'static str,
    tasks: Vec<ExtractTask>,
    context: &RunContext,
) -> Result<Vec<StagedCollection>, ExtractError> {
    tracing::debug!(wave = wave, tasks = tasks.len(), "Spawning extraction wave");

    let mut set = JoinSet::new();
    for task in tasks {
        let store = Arc::clone(&context.store);
        let source = Arc::clone(&context.source);
        set.spawn(run_task(task, store, source));
    }

    let mut staged = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        let outcome = joined
            .map_err(|e| ExtractError::TaskAborted {
                resource: wave.to_string(),
                message: e.to_string(),
            })
            .and_then(|result| result);

        match outcome {
            Ok(collection) => staged.push(collection),
            Err(e) => {
                set.abort_all();
                tracing::error!(wave = wave, error = %e, "Extraction wave aborted");
                return Err(e);
            }
        }
    }

    Ok(staged)
}

/// Fetch every request of a task in order, then replace its collection once
async fn run_task(
    task: ExtractTask,
    store: Arc<dyn StagingStore>,
    source: Arc<dyn SourceApi>,
) -> Result<StagedCollection, ExtractError> {
    let mut documents = Vec::new();
    for parented in &task.requests {
        let fetched = source
            .fetch_all(&parented.request)
            .await
            .map_err(|e| ExtractError::Fetch {
                resource: parented.request.resource.to_string(),
                source: e,
            })?;

        match &parented.annotation {
            Some((key, parent)) => documents.extend(fetched.into_iter().map(|mut doc| {
                set_field(&mut doc, key, Value::String(parent.clone()));
                doc
            })),
            None => documents.extend(fetched),
        }
    }

    let written = store
        .replace_collection(&task.collection, documents)
        .await
        .map_err(|e| ExtractError::Staging {
            collection: task.collection.clone(),
            source: e,
        })?;

    tracing::debug!(
        collection = %task.collection,
        requests = task.requests.len(),
        documents = written,
        "Replaced staging collection"
    );

    Ok(StagedCollection {
        collection: task.collection,
        documents: written,
    })
}

async fn load_parents(
    store: &dyn StagingStore,
    resource: &str,
    filter: Filter,
) -> Result<Vec<Document>, ExtractError> {
    let collection = staging_collection(resource);
    let parents_error = |e| ExtractError::Parents {
        collection: collection.clone(),
        source: e,
    };
    let cursor = store
        .find(&collection, filter, PARENT_BATCH_SIZE)
        .await
        .map_err(parents_error)?;
    collect_all(cursor).await.map_err(parents_error)
}
