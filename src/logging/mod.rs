//! Logging and observability
//!
//! Structured logging with:
//! - Human-readable or JSON console output
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use pimbridge::logging::init_logging;
//! use pimbridge::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(run_id = "abc", "Sync started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline phase
///
/// # Example
///
/// ```no_run
/// use pimbridge::log_phase_start;
///
/// let run_id = "7f9c";
/// log_phase_start!("extract", run_id);
/// ```
#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $run_id:expr) => {
        tracing::info!(
            phase = $phase,
            run_id = %$run_id,
            "Phase started"
        );
    };
}

/// Log the completion of a pipeline phase
///
/// # Example
///
/// ```no_run
/// use pimbridge::log_phase_complete;
/// use std::time::Duration;
///
/// log_phase_complete!("transform", 42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            phase = $phase,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Phase completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use pimbridge::log_error_with_context;
/// use pimbridge::domain::SyncError;
///
/// let error = SyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
