//! # pimbridge - Akeneo to Unchained catalog sync
//!
//! pimbridge mirrors a product catalog kept in an Akeneo PIM into an
//! Unchained Engine shop. Each run is differential: it submits CREATE and
//! UPDATE events only for what changed since the last complete run.
//!
//! ## Pipeline
//!
//! A run moves through three phases, each recorded in a journal:
//!
//! 1. **Extract** - fetch the PIM resources and replace the `akeneo_*`
//!    staging collections with them
//! 2. **Transform** - four mapping passes (products, associations, taxonomy,
//!    channels) turn staged documents into events, classified against the
//!    ledger of previously submitted events
//! 3. **Load** - submit the events in one batch and append them to the ledger
//!
//! The watermark only moves when all three phases succeed, so a failed run is
//! simply repeated by the next one.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Journal, extract, transform, load and the run coordinator
//! - [`adapters`] - Akeneo and Unchained clients, staging stores
//! - [`domain`] - Events, identifiers, document helpers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pimbridge::config::load_config;
//! use pimbridge::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("pimbridge.toml")?;
//!     let coordinator = SyncCoordinator::from_config(&config).await?;
//!
//!     let summary = coordinator.run(config.journal.reset).await?;
//!     println!("Submitted {} events", summary.submitted());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every phase has its own error type in [`domain::errors`]; they all convert
//! into [`domain::SyncError`] with the `?` operator.
//!
//! ## Logging
//!
//! pimbridge logs through `tracing`. Run and phase identifiers are attached as
//! structured fields:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(run_id = "3f2a", "Sync run started");
//! warn!(pass = "taxonomy", "Category has no products");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
