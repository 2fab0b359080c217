//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{StagingBackend, SyncConfig};
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (PIMBRIDGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use pimbridge::config::loader::load_config;
///
/// let config = load_config("pimbridge.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<SyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using PIMBRIDGE_* prefix
///
/// Environment variables follow the pattern: PIMBRIDGE_<SECTION>_<KEY>
/// For example: PIMBRIDGE_AKENEO_ENDPOINT, PIMBRIDGE_JOURNAL_RESET
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Akeneo overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_ENDPOINT") {
        config.akeneo.endpoint = val;
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_USERNAME") {
        config.akeneo.username = val;
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_PASSWORD") {
        config.akeneo.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_CLIENT_ID") {
        config.akeneo.client_id = val;
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_CLIENT_SECRET") {
        config.akeneo.client_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_AKENEO_PAGE_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.akeneo.page_limit = limit;
        }
    }

    // Unchained overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_UNCHAINED_ENDPOINT") {
        config.unchained.endpoint = val;
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_UNCHAINED_EMAIL") {
        config.unchained.email = val;
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_UNCHAINED_PASSWORD") {
        config.unchained.password = secret_string(val);
    }

    // Staging overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_STAGING_BACKEND") {
        config.staging.backend = match val.to_lowercase().as_str() {
            "memory" => StagingBackend::Memory,
            "postgresql" => StagingBackend::PostgreSQL,
            other => {
                return Err(SyncError::Configuration(format!(
                    "Invalid PIMBRIDGE_STAGING_BACKEND '{other}'. Must be one of: memory, postgresql"
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.staging.postgresql {
        if let Ok(val) = std::env::var("PIMBRIDGE_STAGING_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = val;
        }
    }

    // Extract / transform / journal overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_EXTRACT_INCREMENTAL") {
        config.extract.incremental = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_TRANSFORM_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.transform.batch_size = size;
        }
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_JOURNAL_RESET") {
        config.journal.reset = val.parse().unwrap_or(false);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PIMBRIDGE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PIMBRIDGE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
