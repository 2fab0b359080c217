//! Core business logic for pimbridge.
//!
//! # Modules
//!
//! - [`journal`] - Run journal: watermark and completion state machine
//! - [`extract`] - Two-wave extraction from the source into staging
//! - [`transform`] - Mapping passes turning staging into change events
//! - [`load`] - Submission of the event log and ledger bookkeeping
//! - [`sync`] - Run context and the coordinator tying the phases together
//!
//! # Sync Workflow
//!
//! 1. **Start**: the journal computes `since` and records a RUNNING run
//! 2. **Extract**: every source resource replaces its staging collection
//! 3. **Transform**: each pass rewrites its event log from staging and ledger
//! 4. **Load**: the event log is submitted as one batch, then ledgered
//! 5. **Finish**: the journal records COMPLETE or the failing phase
//!
//! # Example
//!
//! ```rust,no_run
//! use pimbridge::config::load_config;
//! use pimbridge::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pimbridge.toml")?;
//! let coordinator = SyncCoordinator::from_config(&config).await?;
//!
//! let summary = coordinator.run(config.journal.reset).await?;
//! println!("Submitted {} events", summary.submitted());
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod journal;
pub mod load;
pub mod sync;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;
