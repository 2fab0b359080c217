//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for pimbridge using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// pimbridge - Akeneo to Unchained catalog sync
#[derive(Parser, Debug)]
#[command(name = "pimbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pimbridge.toml", env = "PIMBRIDGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PIMBRIDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one differential sync
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show recent sync runs from the journal
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["pimbridge", "sync"]);
        assert_eq!(cli.config, "pimbridge.toml");
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_cli_parse_sync_flags() {
        let cli = Cli::parse_from(["pimbridge", "sync", "--reset", "--batch-size", "50"]);
        match cli.command {
            Commands::Sync(args) => {
                assert!(args.reset);
                assert!(!args.incremental);
                assert_eq!(args.batch_size, Some(50));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["pimbridge", "--config", "custom.toml", "sync"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["pimbridge", "--log-level", "debug", "sync"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["pimbridge", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["pimbridge", "status", "--limit", "5"]);
        match cli.command {
            Commands::Status(args) => assert_eq!(args.limit, 5),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["pimbridge", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
