//! Source API abstraction
//!
//! The extractor only needs "fetch every page of resource X". Tests provide
//! in-memory implementations.

use super::models::FetchRequest;
use crate::domain::errors::SourceError;
use crate::domain::record::Document;
use async_trait::async_trait;

/// Read access to the product-information source
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Base URL, for logs
    fn endpoint(&self) -> &str;

    /// Fetch every page of a resource
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched; partial results are
    /// never returned.
    async fn fetch_all(&self, request: &FetchRequest) -> Result<Vec<Document>, SourceError>;
}
