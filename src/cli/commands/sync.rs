//! Sync command implementation
//!
//! This module implements the `sync` command, which runs one differential
//! sync from Akeneo to Unchained.

use crate::config::load_config;
use crate::core::sync::SyncCoordinator;
use crate::domain::SyncError;
use clap::Args;
use tokio::sync::watch;

/// Exit code of a COMPLETE run
pub const EXIT_COMPLETE: i32 = 0;
/// Configuration could not be loaded or is invalid
pub const EXIT_CONFIGURATION: i32 = 2;
/// A collaborator could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Anything else
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_FAILED_EXTRACT: i32 = 10;
pub const EXIT_FAILED_TRANSFORM: i32 = 11;
pub const EXIT_FAILED_LOAD: i32 = 12;
/// Interrupted by a signal
pub const EXIT_INTERRUPTED: i32 = 130;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Diff against the Unix epoch instead of the last complete run
    #[arg(long)]
    pub reset: bool,

    /// Only announce products updated since the last complete run
    #[arg(long)]
    pub incremental: bool,

    /// Override the transform cursor batch size
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Map a run error to the process exit code
pub fn exit_code_for(error: &SyncError) -> i32 {
    match error {
        SyncError::Extract(_) => EXIT_FAILED_EXTRACT,
        SyncError::Transform(_) => EXIT_FAILED_TRANSFORM,
        SyncError::Load(_) => EXIT_FAILED_LOAD,
        SyncError::Configuration(_) | SyncError::Validation(_) => EXIT_CONFIGURATION,
        SyncError::Source(_) | SyncError::Target(_) | SyncError::Store(_) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        if self.reset {
            tracing::info!("Journal reset requested from CLI");
            config.journal.reset = true;
        }
        if self.incremental {
            tracing::info!("Incremental extraction enabled from CLI");
            config.extract.incremental = true;
        }
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size = batch_size, "Overriding batch size from CLI");
            config.transform.batch_size = batch_size;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIGURATION);
        }

        let coordinator = match SyncCoordinator::from_config(&config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize sync");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting sync...");
        println!();

        let outcome = tokio::select! {
            outcome = coordinator.run(config.journal.reset) => outcome,
            _ = wait_for_shutdown(&mut shutdown_signal) => {
                tracing::warn!("Sync interrupted, the run stays RUNNING in the journal");
                println!();
                println!("⚠️  Sync interrupted. The next run starts from the last complete run.");
                return Ok(EXIT_INTERRUPTED);
            }
        };

        match outcome {
            Ok(summary) => {
                println!("📊 Sync Summary:");
                println!("  Run: {}", summary.run_id);
                println!("  Since: {}", summary.since.to_rfc3339());
                println!("  Staged Documents: {}", summary.extract.total_documents());
                for (pass, events) in &summary.transform.passes {
                    println!("  Events ({pass}): {events}");
                }
                println!("  Submitted: {}", summary.submitted());
                println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
                println!();
                println!("✅ Sync completed successfully!");
                Ok(EXIT_COMPLETE)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Resolve once the shutdown flag is raised; never if the sender is gone
async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow() {
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
