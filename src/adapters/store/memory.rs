//! In-process staging store
//!
//! Used for development runs and tests. Contents are lost when the process
//! exits, so the journal and ledger do not survive between invocations.

use crate::adapters::store::query::{apply_stage, Filter, Stage};
use crate::adapters::store::traits::{DocumentCursor, StagingStore, StoreResult};
use crate::domain::record::Document;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Staging store backed by a map of vectors
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection, empty if it was never written
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl StagingStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn replace_collection(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize> {
        let inserted = documents.len();
        self.collections
            .write()
            .await
            .insert(collection.to_string(), documents);
        Ok(inserted)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>> {
        let docs: Vec<Document> = self
            .documents(collection)
            .await
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect();
        Ok(Box::new(VecCursor::new(docs, batch_size)))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Stage>,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>> {
        let mut docs = self.documents(collection).await;
        for stage in &pipeline {
            let foreign = match stage {
                Stage::Lookup(lookup) => self.documents(&lookup.from).await,
                _ => Vec::new(),
            };
            docs = apply_stage(docs, stage, &foreign);
        }
        Ok(Box::new(VecCursor::new(docs, batch_size)))
    }

    async fn bulk_insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let inserted = documents.len();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(inserted)
    }
}

/// Cursor over an already materialized result set
struct VecCursor {
    docs: VecDeque<Document>,
    batch_size: usize,
}

impl VecCursor {
    fn new(docs: Vec<Document>, batch_size: usize) -> Self {
        Self {
            docs: docs.into(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl DocumentCursor for VecCursor {
    async fn next_batch(&mut self) -> StoreResult<Option<Vec<Document>>> {
        if self.docs.is_empty() {
            return Ok(None);
        }
        let take = self.batch_size.min(self.docs.len());
        Ok(Some(self.docs.drain(..take).collect()))
    }
}
