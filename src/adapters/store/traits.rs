//! Staging store abstraction
//!
//! Staging snapshots, per-pass event logs, the submitted-event ledger and
//! the sync journal are all plain document collections behind this trait.

use crate::adapters::store::query::{Filter, Stage};
use crate::domain::errors::StoreError;
use crate::domain::record::Document;
use async_trait::async_trait;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Batched cursor over query results
///
/// Batches never exceed the size requested when the cursor was opened.
#[async_trait]
pub trait DocumentCursor: Send {
    /// Next non-empty batch, or `None` once the results are exhausted
    async fn next_batch(&mut self) -> StoreResult<Option<Vec<Document>>>;
}

/// Drain a cursor into memory
///
/// Only for collections known to be small (association types, channels,
/// journal records).
pub async fn collect_all(mut cursor: Box<dyn DocumentCursor>) -> StoreResult<Vec<Document>> {
    let mut docs = Vec::new();
    while let Some(batch) = cursor.next_batch().await? {
        docs.extend(batch);
    }
    Ok(docs)
}

/// Document store used for staging, event logs, ledger and journal
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Backend name, for logs and the status command
    fn backend_name(&self) -> &'static str;

    /// Prepare the backend (schema, connectivity)
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or initialized.
    async fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Delete every document in `collection`, then insert `documents`
    ///
    /// Replacing with an empty vector clears the collection.
    ///
    /// # Returns
    ///
    /// Number of documents inserted
    async fn replace_collection(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize>;

    /// Documents matching `filter`, in insertion order
    async fn find(
        &self,
        collection: &str,
        filter: Filter,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>>;

    /// Documents of `collection` run through `pipeline`, in insertion order
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Stage>,
        batch_size: usize,
    ) -> StoreResult<Box<dyn DocumentCursor>>;

    /// Append documents without ordering guarantees between them
    ///
    /// An empty input is a no-op.
    ///
    /// # Returns
    ///
    /// Number of documents inserted
    async fn bulk_insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<usize>;
}
