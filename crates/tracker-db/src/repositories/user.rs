use crate::models::DbUser;
use crate::Result;
use sqlx::SqlitePool;

pub struct UserRepository;

impl UserRepository {
    /// Get every registered user
    pub async fn get_all(pool: &SqlitePool) -> Result<Vec<DbUser>> {
        let results = sqlx::query_as::<_, DbUser>("SELECT username, address FROM users")
            .fetch_all(pool)
            .await?;
        Ok(results)
    }
}
