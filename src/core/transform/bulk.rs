//! Unordered bulk queue for pass output

use crate::adapters::store::StagingStore;
use crate::domain::errors::TransformError;
use crate::domain::event::Event;

/// Events queued by a pass, written in one bulk insert
#[derive(Debug)]
pub struct BulkQueue {
    pass: &'static str,
    collection: String,
    queued: Vec<Event>,
}

impl BulkQueue {
    pub fn new(pass: &'static str, collection: impl Into<String>) -> Self {
        Self {
            pass,
            collection: collection.into(),
            queued: Vec::new(),
        }
    }

    pub fn insert(&mut self, event: Event) {
        self.queued.push(event);
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Write every queued event
    ///
    /// An empty queue writes nothing and reports zero events.
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be encoded or the insert fails.
    pub async fn flush(self, store: &dyn StagingStore) -> Result<usize, TransformError> {
        if self.queued.is_empty() {
            tracing::debug!(pass = self.pass, "No events to flush");
            return Ok(0);
        }

        let documents = self
            .queued
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TransformError::MalformedField {
                pass: self.pass.to_string(),
                field: "payload".to_string(),
                message: e.to_string(),
            })?;

        store
            .bulk_insert_unordered(&self.collection, documents)
            .await
            .map_err(|e| TransformError::Store {
                pass: self.pass.to_string(),
                source: e,
            })
    }
}
