//! Run orchestration
//!
//! - [`context`] - the [`RunContext`] handed to every phase
//! - [`coordinator`] - the [`SyncCoordinator`] driving a run
//! - [`summary`] - the [`SyncSummary`] of a COMPLETE run

pub mod context;
pub mod coordinator;
pub mod summary;

pub use context::{RunContext, RunSettings};
pub use coordinator::SyncCoordinator;
pub use summary::SyncSummary;
