use async_trait::async_trait;
use tracker_core::types::TipHash;
use tracker_core::Result;

/// Persistence for the last tip hash whose block was fully scanned
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self) -> Result<Option<TipHash>>;

    async fn save(&self, hash: &TipHash) -> Result<()>;
}
