//! Domain models and types for pimbridge.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`RunId`], [`EventId`])
//! - **Change events** ([`Event`], [`SubmittedEventRecord`])
//! - **Staging record helpers** ([`record`])
//! - **Error types** ([`SyncError`] and one error type per phase/collaborator)
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, SyncError>`]; phase
//! functions return their own error type which converts with `?`:
//!
//! ```rust
//! use pimbridge::domain::{Result, TransformError};
//!
//! fn example() -> Result<()> {
//!     let failed: std::result::Result<(), TransformError> = Ok(());
//!     failed?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod event;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{
    ExtractError, JournalError, LoadError, SourceError, StoreError, SyncError, TargetError,
    TransformError,
};
pub use event::{Entity, Event, Operation, SubmittedEventRecord};
pub use ids::{EventId, RunId};
pub use record::Document;
pub use result::Result;
