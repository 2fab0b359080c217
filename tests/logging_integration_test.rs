//! Integration tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so only one
//! test in this file initializes logging successfully.

use pimbridge::config::LoggingConfig;
use pimbridge::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert!(!config.json_console);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "/var/log/pimbridge");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let result = init_logging("verbose", &LoggingConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_file_logging_writes_rolling_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
        json_console: true,
    };

    let guard = init_logging("debug", &config).expect("Failed to initialize logging");
    assert!(guard.has_file_writer());
    assert!(log_path.exists());

    tracing::info!(run_id = "run-1", "Sync run started");
    drop(guard);

    let files: Vec<_> = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert!(files.iter().any(|name| name.starts_with("pimbridge.log")));
}
