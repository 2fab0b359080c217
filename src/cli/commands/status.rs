//! Status command implementation
//!
//! This module implements the `status` command, which lists the most recent
//! runs recorded in the journal.

use crate::adapters::store::create_staging_store;
use crate::config::{load_config, StagingBackend};
use crate::core::journal::{CompletionStatus, Journal, JournalRecord};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of runs to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if config.staging.backend == StagingBackend::Memory {
            println!("The memory staging backend keeps no journal between runs.");
            println!("Configure staging.backend = \"postgresql\" to track run history.");
            return Ok(0);
        }

        let store = match create_staging_store(&config.staging).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to staging store");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let journal = Journal::new(store);
        let runs = match journal.history(self.limit).await {
            Ok(runs) => runs,
            Err(e) => {
                println!("❌ Failed to read the journal");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if runs.is_empty() {
            println!("No sync history found.");
            println!("Run 'pimbridge sync' to start syncing.");
            return Ok(0);
        }

        println!("Found {} run(s):", runs.len());
        println!();
        println!(
            "{:<38} {:<20} {:<21} {:<21} {:<8}",
            "Run ID", "Status", "Started", "Since", "Events"
        );
        println!("{}", "-".repeat(110));
        for run in &runs {
            println!("{}", format_run(run));
        }
        println!();
        Ok(0)
    }
}

fn status_label(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Complete => "✅ COMPLETE",
        CompletionStatus::Running => "🔄 RUNNING",
        CompletionStatus::FailedExtract => "❌ FAILED_EXTRACT",
        CompletionStatus::FailedTransform => "❌ FAILED_TRANSFORM",
        CompletionStatus::FailedLoad => "❌ FAILED_LOAD",
    }
}

fn format_run(run: &JournalRecord) -> String {
    format!(
        "{:<38} {:<20} {:<21} {:<21} {:<8}",
        run.run_id.as_str(),
        status_label(run.status),
        run.started_at.format("%Y-%m-%d %H:%M:%S"),
        run.since.format("%Y-%m-%d %H:%M:%S"),
        run.event_ids.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::RunId;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_format_run() {
        let record = JournalRecord {
            run_id: RunId::new("run-1").unwrap(),
            since: DateTime::<Utc>::UNIX_EPOCH,
            started_at: DateTime::<Utc>::UNIX_EPOCH,
            status: CompletionStatus::FailedLoad,
            finished_at: None,
            event_ids: vec!["PRODUCT:p1".parse().unwrap()],
        };

        let line = format_run(&record);
        assert!(line.starts_with("run-1"));
        assert!(line.contains("FAILED_LOAD"));
        assert!(line.contains("1970-01-01 00:00:00"));
        assert!(line.trim_end().ends_with('1'));
    }
}
