mod block;
mod reward;
mod user;

pub use block::{Block, Output, TipHash, Transaction, COINBASE_SUBNETWORK_ID};
pub use reward::{Reward, RewardMatchEvent, SOMPI_PER_COIN};
pub use user::User;

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds since Unix epoch
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
