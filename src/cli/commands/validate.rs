//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the pimbridge configuration file.

use crate::config::{load_config, StagingBackend, SyncConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well; a failure here covers both
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        Ok(0)
    }
}

fn print_summary(config: &SyncConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Akeneo Endpoint: {}", config.akeneo.endpoint);
    println!("  Akeneo API User: {}", config.akeneo.username);
    println!("  Akeneo Page Limit: {}", config.akeneo.page_limit);
    println!("  Unchained Endpoint: {}", config.unchained.endpoint);
    println!("  Unchained User: {}", config.unchained.email);

    match config.staging.backend {
        StagingBackend::Memory => {
            println!("  Staging Backend: memory (journal and ledger are not persisted)");
        }
        StagingBackend::PostgreSQL => {
            println!("  Staging Backend: postgresql");
            if let Some(ref pg) = config.staging.postgresql {
                println!(
                    "  PostgreSQL Host: {}",
                    pg.connection_string
                        .split('@')
                        .next_back()
                        .unwrap_or("***")
                );
                println!("  Max Connections: {}", pg.max_connections);
            }
        }
    }

    println!(
        "  Product Events: {}",
        if config.extract.incremental {
            "updated since last run"
        } else {
            "all"
        }
    );
    println!("  Transform Batch Size: {}", config.transform.batch_size);
    println!("  Journal Reset: {}", config.journal.reset);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_a_configuration_error() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/pimbridge.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[akeneo]
endpoint = "https://pim.example.com"
username = "api"
password = "pass"
client_id = "client"
client_secret = "secret"

[unchained]
endpoint = "https://engine.example.com"
email = "admin@example.com"
password = "pass"
"#,
        )
        .unwrap();

        let args = ValidateArgs {};
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }
}
