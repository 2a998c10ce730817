use tracker_core::types::{Block, Reward, RewardMatchEvent};
use tracker_store::DirectorySnapshot;

/// Matches block outputs against the address directory.
///
/// Pure: the same block and snapshot always yield the same events, one per
/// matching output, in transaction then output order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardScanner {
    coinbase_only: bool,
}

impl RewardScanner {
    pub fn new(coinbase_only: bool) -> Self {
        Self { coinbase_only }
    }

    pub fn scan(&self, block: &Block, directory: &DirectorySnapshot) -> Vec<RewardMatchEvent> {
        block
            .transactions
            .iter()
            .filter(|tx| !self.coinbase_only || tx.is_coinbase())
            .flat_map(|tx| tx.outputs.iter())
            .filter_map(|output| {
                directory
                    .lookup(&output.miner_address)
                    .map(|username| RewardMatchEvent {
                        username: username.to_string(),
                        address: output.miner_address.clone(),
                        reward: Reward::from_raw(output.amount_raw),
                        block_hash: block.hash.clone(),
                    })
            })
            .collect()
    }
}
