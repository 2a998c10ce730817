use async_trait::async_trait;
use tracker_core::types::{Block, TipHash};
use tracker_core::Result;

pub const OP_GET_SELECTED_TIP_HASH: &str = "GetSelectedTipHash";
pub const OP_GET_BLOCK: &str = "GetBlock";

/// The two node operations the tracker relies on.
///
/// Failures are typed: a non-zero exit is `TrackerError::Command`, output
/// that is not the expected JSON is `TrackerError::Parse`, and a query that
/// outlives its bound is `TrackerError::Timeout`.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Hash of the node's current best block
    async fn get_selected_tip_hash(&self) -> Result<TipHash>;

    /// Fetch a block with its transactions
    async fn get_block(&self, hash: &TipHash) -> Result<Block>;
}
