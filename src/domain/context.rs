//! Error context extension trait
//!
//! Provides `.context()` / `.with_context()` for `Result<T, E>` where `E`
//! converts into [`SyncError`], similar to `anyhow::Context` but keeping the
//! domain error type inside the library.
//!
//! Message-carrying variants keep their kind so exit-code mapping still
//! works; structured variants are flattened into [`SyncError::Other`].
//!
//! # Examples
//!
//! ```rust
//! use pimbridge::domain::Result;
//! use pimbridge::domain::context::ResultExt;
//!
//! fn read_mapping(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read mapping file {path}"))
//! }
//! ```

use crate::domain::errors::SyncError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (evaluated only on error)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SyncError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(error: SyncError, context: &dyn std::fmt::Display) -> SyncError {
    match error {
        SyncError::Configuration(msg) => SyncError::Configuration(format!("{context}: {msg}")),
        SyncError::Validation(msg) => SyncError::Validation(format!("{context}: {msg}")),
        SyncError::Serialization(msg) => SyncError::Serialization(format!("{context}: {msg}")),
        SyncError::Io(msg) => SyncError::Io(format!("{context}: {msg}")),
        other => SyncError::Other(format!("{context}: {other}")),
    }
}
