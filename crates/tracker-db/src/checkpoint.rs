use async_trait::async_trait;
use tracing::info;
use tracker_core::types::TipHash;
use tracker_core::{Result, TrackerError};
use tracker_store::CheckpointStore;

use crate::pool::DatabasePool;
use crate::repositories::CheckpointRepository;

/// Last-checked tip hash kept in the tracker's state database
pub struct SqlCheckpointStore {
    db: DatabasePool,
}

impl SqlCheckpointStore {
    /// Wrap a pool whose migrations have already run
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckpointStore for SqlCheckpointStore {
    async fn load(&self) -> Result<Option<TipHash>> {
        let state = CheckpointRepository::get_state(self.db.inner())
            .await
            .map_err(|e| TrackerError::Checkpoint(e.to_string()))?;

        Ok(state.map(|(hash, updated_at)| {
            info!(hash = %hash, updated_at, "Loaded last checked tip hash");
            TipHash::new(hash)
        }))
    }

    async fn save(&self, hash: &TipHash) -> Result<()> {
        CheckpointRepository::set_last_checked_hash(self.db.inner(), hash.as_str())
            .await
            .map_err(|e| TrackerError::Checkpoint(e.to_string()))
    }
}
