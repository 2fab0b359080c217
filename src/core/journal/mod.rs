//! Sync journal: watermark and run outcomes

pub mod entry;
pub mod manager;

pub use entry::{CompletionStatus, JournalEntry, JournalRecord};
pub use manager::Journal;
