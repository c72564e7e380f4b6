//! Node store that dispatches to the configured repository backend.

use std::sync::Arc;

use tracing::info;

use picvault_core::config::DatabaseConfig;
use picvault_core::error::AppError;
use picvault_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::repositories::node::{MemoryNodeRepository, NodeRepository, PgNodeRepository};

/// Owns the selected [`NodeRepository`] and, for Postgres, its pool.
#[derive(Debug, Clone)]
pub struct NodeStore {
    repository: Arc<dyn NodeRepository>,
    pool: Option<DatabasePool>,
}

impl NodeStore {
    /// Build the backend named by `database.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL node repository");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                let repository = PgNodeRepository::new(pool.pool().clone(), config);
                Ok(Self {
                    repository: Arc::new(repository),
                    pool: Some(pool),
                })
            }
            "memory" => {
                info!("Initializing in-memory node repository");
                Ok(Self::in_memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// A store backed by a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self::from_repository(Arc::new(MemoryNodeRepository::new()))
    }

    /// Wrap an existing repository (for testing).
    pub fn from_repository(repository: Arc<dyn NodeRepository>) -> Self {
        Self {
            repository,
            pool: None,
        }
    }

    /// Shared handle to the repository.
    pub fn repository(&self) -> Arc<dyn NodeRepository> {
        Arc::clone(&self.repository)
    }

    /// The Postgres pool, when that backend is in use.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
