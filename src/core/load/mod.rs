//! Load phase
//!
//! Submits the transform's event log to the target and appends the accepted
//! events to the ledger.

pub mod loader;

pub use loader::{load, read_event_log};
