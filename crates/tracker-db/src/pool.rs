use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, Result};

/// SQLite pool plus the settings it was opened with
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
    url: String,
    read_only: bool,
}

impl DatabasePool {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let open_err = |source| DatabaseError::Open {
            url: config.url.clone(),
            source,
        };

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(open_err)?
            .read_only(config.read_only)
            .create_if_missing(config.create_if_missing)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await
            .map_err(open_err)?;

        info!(
            url = %config.url,
            read_only = config.read_only,
            max_connections = config.max_connections,
            "SQLite database opened"
        );

        Ok(Self {
            pool,
            url: config.url.clone(),
            read_only: config.read_only,
        })
    }

    /// Apply the embedded schema for tracker-owned state. Refused on a
    /// read-only pool so the registry is never altered.
    pub async fn migrate(&self) -> Result<()> {
        if self.read_only {
            return Err(DatabaseError::ReadOnly(self.url.clone()));
        }
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        debug!(url = %self.url, "Migrations applied");
        Ok(())
    }

    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Round-trip a trivial statement to prove the file is readable
    pub async fn health_check(&self) -> Result<()> {
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        debug!(url = %self.url, result = one, "Database reachable");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!(url = %self.url, "Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_registry_file_fails_to_open() {
        let config = DatabaseConfig::registry("sqlite:///nonexistent/dir/users.db");
        assert!(matches!(
            DatabasePool::new(&config).await,
            Err(DatabaseError::Open { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_state_pool_is_healthy() {
        let pool = DatabasePool::new(&DatabaseConfig::state("sqlite::memory:"))
            .await
            .unwrap();
        assert!(!pool.is_read_only());
        pool.health_check().await.unwrap();
        pool.migrate().await.unwrap();
    }
}
