//! Staging store factory
//!
//! Creates the store backend selected in configuration.

use crate::adapters::postgresql::{PostgreSQLClient, PostgresStore};
use crate::adapters::store::memory::MemoryStore;
use crate::adapters::store::traits::StagingStore;
use crate::config::schema::{StagingBackend, StagingConfig};
use crate::domain::{Result, SyncError};
use std::sync::Arc;

/// Create and initialize the staging store
///
/// # Arguments
///
/// * `config` - The staging section of the configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements StagingStore
///
/// # Errors
///
/// Returns an error if the backend cannot be created or initialized
pub async fn create_staging_store(config: &StagingConfig) -> Result<Arc<dyn StagingStore>> {
    let store: Arc<dyn StagingStore> = match config.backend {
        StagingBackend::Memory => {
            tracing::info!("Creating in-memory staging store");
            Arc::new(MemoryStore::new())
        }
        StagingBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                SyncError::Configuration(
                    "staging.postgresql configuration is required for the postgresql backend"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL staging store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            Arc::new(PostgresStore::new(client))
        }
    };

    store.initialize().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = create_staging_store(&StagingConfig::default()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_section() {
        let config = StagingConfig {
            backend: StagingBackend::PostgreSQL,
            postgresql: None,
        };
        let err = create_staging_store(&config).await.err().unwrap();
        assert!(matches!(err, SyncError::Configuration(_)));
    }
}
