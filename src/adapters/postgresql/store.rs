//! PostgreSQL implementation of the staging store
//!
//! Filters and pipeline stages are evaluated in process on keyset-paginated
//! pages; lookups fetch only the foreign documents the current page refers to.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::store::query::{apply_stage, key_as_text, lookup_keys, Filter, Stage};
use crate::adapters::store::traits::{DocumentCursor, StagingStore, StoreResult};
use crate::domain::record::Document;
use async_trait::async_trait;
use std::sync::Arc;

/// Staging store persisted in PostgreSQL
pub struct PostgresStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgresStore {
    /// Create a store over an existing client
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    fn cursor(&self, collection: &str, pipeline: Vec<Stage>, batch_size: usize) -> PgCursor {
        PgCursor {
            client: Arc::clone(&self.client),
            collection: collection.to_string(),
            pipeline,
            last_seq: 0,
            batch_size: batch_size.max(1) as i64,
            exhausted: false,
        }
    }
}

#[async_trait]
impl StagingStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn initialize(&self) -> StoreResult<()> {
        self.client.test_connection().await?;
        self.client.ensure_schema().await
    }

    async fn replace_collection(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize> {
        let inserted = self.client.replace(collection, documents).await?;
        tracing::debug!(collection, inserted, "Collection replaced");
        Ok(inserted as usize)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>> {
        let pipeline = match filter {
            Filter::All => Vec::new(),
            other => vec![Stage::Match(other)],
        };
        Ok(Box::new(self.cursor(collection, pipeline, batch_size)))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Stage>,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>> {
        Ok(Box::new(self.cursor(collection, pipeline, batch_size)))
    }

    async fn bulk_insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let inserted = self.client.append(collection, documents).await?;
        Ok(inserted as usize)
    }
}

/// Keyset-paginated cursor applying a pipeline page by page
struct PgCursor {
    client: Arc<PostgreSQLClient>,
    collection: String,
    pipeline: Vec<Stage>,
    last_seq: i64,
    batch_size: i64,
    exhausted: bool,
}

impl PgCursor {
    async fn run_pipeline(&self, mut docs: Vec<Document>) -> StoreResult<Vec<Document>> {
        for stage in &self.pipeline {
            let foreign = match stage {
                Stage::Lookup(lookup) => {
                    let keys = lookup_keys(&docs, lookup)
                        .iter()
                        .map(key_as_text)
                        .collect();
                    self.client
                        .fetch_by_keys(&lookup.from, &lookup.foreign_field, keys)
                        .await?
                }
                _ => Vec::new(),
            };
            docs = apply_stage(docs, stage, &foreign);
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentCursor for PgCursor {
    async fn next_batch(&mut self) -> StoreResult<Option<Vec<Document>>> {
        // Pages can be filtered down to nothing; keep reading until a page
        // survives the pipeline or the collection ends.
        while !self.exhausted {
            let rows = self
                .client
                .fetch_page(&self.collection, self.last_seq, self.batch_size)
                .await?;

            if (rows.len() as i64) < self.batch_size {
                self.exhausted = true;
            }
            if let Some((seq, _)) = rows.last() {
                self.last_seq = *seq;
            }

            let docs = rows.into_iter().map(|(_, doc)| doc).collect();
            let docs = self.run_pipeline(docs).await?;
            if !docs.is_empty() {
                return Ok(Some(docs));
            }
        }
        Ok(None)
    }
}
