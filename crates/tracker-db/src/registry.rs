use async_trait::async_trait;
use tracker_core::types::User;
use tracker_core::{Result, TrackerError};
use tracker_store::UserRegistry;

use crate::pool::DatabasePool;
use crate::repositories::UserRepository;

/// Registry backed by the `users` table
pub struct SqlUserRegistry {
    db: DatabasePool,
}

impl SqlUserRegistry {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRegistry for SqlUserRegistry {
    async fn load_users(&self) -> Result<Vec<User>> {
        let rows = UserRepository::get_all(self.db.inner())
            .await
            .map_err(|e| TrackerError::Registry(e.to_string()))?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn memory_pool() -> DatabasePool {
        let mut config = DatabaseConfig::state("sqlite::memory:");
        config.max_connections = 1;
        DatabasePool::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_users() {
        let db = memory_pool().await;
        sqlx::query("CREATE TABLE users (username TEXT NOT NULL, address TEXT NOT NULL UNIQUE)")
            .execute(db.inner())
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (username, address) VALUES ('alice', 'addr1'), ('bob', 'addr2')")
            .execute(db.inner())
            .await
            .unwrap();

        let registry = SqlUserRegistry::new(db);
        let mut users = registry.load_users().await.unwrap();
        users.sort_by(|a, b| a.address.cmp(&b.address));
        assert_eq!(
            users,
            vec![User::new("alice", "addr1"), User::new("bob", "addr2")]
        );
    }

    #[tokio::test]
    async fn test_missing_table_is_registry_error() {
        let registry = SqlUserRegistry::new(memory_pool().await);
        assert!(matches!(
            registry.load_users().await,
            Err(TrackerError::Registry(_))
        ));
    }
}
