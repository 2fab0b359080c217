//! Mapping pass driver
//!
//! A pass reads one or more staging collections through a pipeline, maps
//! each document to at most one event and writes the events to its own log.

use super::bulk::BulkQueue;
use super::diff::{DiffContext, LedgerIndex};
use crate::adapters::store::{Stage, StagingStore};
use crate::core::sync::RunContext;
use crate::domain::errors::{StoreError, TransformError};
use crate::domain::event::Event;
use crate::domain::record::{field, parse_timestamp, Document};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Event log written by a pass
pub fn event_collection(pass: &str) -> String {
    format!("unchained_events_{pass}")
}

/// A staging collection and the pipeline applied while streaming it
#[derive(Debug, Clone, PartialEq)]
pub struct PassSource {
    pub collection: String,
    pub pipeline: Vec<Stage>,
}

impl PassSource {
    pub fn new(collection: impl Into<String>, pipeline: Vec<Stage>) -> Self {
        Self {
            collection: collection.into(),
            pipeline,
        }
    }
}

/// One mapping pass
#[async_trait]
pub trait MappingPass: Send + Sync {
    /// Lookup data the pass reads before streaming its sources
    type Context: Send + Sync;

    /// Pass name; also names the event log
    fn name(&self) -> &'static str;

    /// Load lookup data
    ///
    /// # Errors
    ///
    /// Returns an error if a staging collection cannot be read.
    async fn prepare(
        &self,
        store: &dyn StagingStore,
        batch_size: usize,
    ) -> Result<Self::Context, TransformError>;

    /// Collections to stream, in order
    fn sources(&self, context: &Self::Context) -> Vec<PassSource>;

    /// Map one document to at most one event
    ///
    /// Must not depend on anything but its arguments.
    fn map(
        &self,
        doc: &Document,
        context: &Self::Context,
        diff: &DiffContext<'_>,
    ) -> Result<Option<Event>, TransformError>;
}

/// Run a pass end to end
///
/// Clears the pass's event log, streams every source through
/// [`MappingPass::map`] and flushes the queued events once.
///
/// # Returns
///
/// Number of events written
pub async fn run_pass<P: MappingPass>(
    pass: &P,
    context: &RunContext,
    ledger: &LedgerIndex,
) -> Result<usize, TransformError> {
    let name = pass.name();
    let store = context.store.as_ref();
    let batch_size = context.settings.batch_size;
    let collection = event_collection(name);

    store
        .replace_collection(&collection, Vec::new())
        .await
        .map_err(|e| store_error(name, e))?;

    let prepared = pass.prepare(store, batch_size).await?;
    let diff = DiffContext::new(context.since(), ledger);
    let mut queue = BulkQueue::new(name, collection);
    let mut read = 0usize;

    for source in pass.sources(&prepared) {
        let mut cursor = store
            .aggregate(&source.collection, source.pipeline, batch_size)
            .await
            .map_err(|e| store_error(name, e))?;

        while let Some(batch) = cursor.next_batch().await.map_err(|e| store_error(name, e))? {
            read += batch.len();
            for doc in &batch {
                if let Some(event) = pass.map(doc, &prepared, &diff)? {
                    queue.insert(event);
                }
            }
        }
    }

    let written = queue.flush(store).await?;
    tracing::info!(pass = name, read = read, events = written, "Mapping pass finished");
    Ok(written)
}

pub(crate) fn store_error(pass: &str, source: StoreError) -> TransformError {
    TransformError::Store {
        pass: pass.to_string(),
        source,
    }
}

/// String field a mapping cannot do without
pub(crate) fn required_str<'a>(
    pass: &str,
    doc: &'a Document,
    path: &str,
) -> Result<&'a str, TransformError> {
    crate::domain::record::str_field(doc, path).ok_or_else(|| TransformError::MissingField {
        pass: pass.to_string(),
        field: path.to_string(),
    })
}

/// String items of an array field; a missing field is empty
pub(crate) fn str_list<'a>(doc: &'a Document, path: &str) -> Vec<&'a str> {
    field(doc, path)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Timestamp field of a staged document
///
/// An absent or null field is `None`. Anything else must be an RFC 3339
/// timestamp.
pub(crate) fn timestamp_field(
    pass: &str,
    doc: &Document,
    path: &str,
) -> Result<Option<DateTime<Utc>>, TransformError> {
    match field(doc, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| TransformError::MalformedField {
                pass: pass.to_string(),
                field: path.to_string(),
                message: format!("expected an RFC 3339 timestamp, got {value}"),
            }),
    }
}
