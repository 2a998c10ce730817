use crate::Result;
use sqlx::SqlitePool;
use tracker_core::types::now_secs;

pub struct CheckpointRepository;

impl CheckpointRepository {
    /// Get the last checked hash with its update time (None if never stored)
    pub async fn get_state(pool: &SqlitePool) -> Result<Option<(String, i64)>> {
        let result: Option<(String, i64)> = sqlx::query_as(
            "SELECT last_checked_hash, updated_at FROM tracker_state WHERE id = 'main'",
        )
        .fetch_optional(pool)
        .await?;

        Ok(result.filter(|(hash, _)| !hash.is_empty()))
    }

    /// Store the last checked tip hash
    pub async fn set_last_checked_hash(pool: &SqlitePool, hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tracker_state (id, last_checked_hash, updated_at)
            VALUES ('main', ?1, ?2)
            ON CONFLICT (id) DO UPDATE SET
                last_checked_hash = excluded.last_checked_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(hash)
        .bind(now_secs())
        .execute(pool)
        .await?;
        Ok(())
    }
}
