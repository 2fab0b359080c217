//! Staging store abstraction layer
//!
//! - [`traits`] - The [`StagingStore`] and [`DocumentCursor`] traits
//! - [`query`] - Typed filters and pipeline stages
//! - [`memory`] - In-process backend
//! - [`factory`] - Backend selection from configuration
//!
//! The PostgreSQL backend lives in [`crate::adapters::postgresql`].

pub mod factory;
pub mod memory;
pub mod query;
pub mod traits;

pub use factory::create_staging_store;
pub use memory::MemoryStore;
pub use query::{FieldExpr, Filter, Lookup, Stage};
pub use traits::{collect_all, DocumentCursor, StagingStore, StoreResult};

/// Staging collection for a source resource
pub fn staging_collection(resource: &str) -> String {
    format!("akeneo_{resource}")
}

/// Ledger of events accepted by the target platform
pub const SUBMITTED_EVENTS_COLLECTION: &str = "unchained_submitted_events";

/// Append-only journal of sync runs
pub const JOURNAL_COLLECTION: &str = "sync_journal";
